//! Goals and the date handling around them.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Wire and storage format of a due date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A personal goal with a due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
  pub id:                i64,
  pub user_id:           i64,
  /// HTML-escaped at input time.
  pub goal:              String,
  pub due:               NaiveDate,
  pub visible_to_public: bool,
  pub achieved:          bool,
}

impl Goal {
  /// A goal is overdue once its due date has passed without it being
  /// achieved.
  pub fn is_overdue(&self, today: NaiveDate) -> bool {
    !self.achieved && self.due < today
  }

  /// The due date formatted for form inputs.
  pub fn due_str(&self) -> String { self.due.format(DATE_FORMAT).to_string() }
}

/// Fields a user supplies when adding or editing a goal.
#[derive(Debug, Clone)]
pub struct GoalInput {
  pub goal:              String,
  pub due:               NaiveDate,
  pub visible_to_public: bool,
  pub achieved:          bool,
}

/// Goals sharing a due year, in list order.
#[derive(Debug, Clone)]
pub struct GoalGroup {
  pub year:  i32,
  pub goals: Vec<Goal>,
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| Error::InvalidDate(s.to_owned()))
}

/// Split goals (already sorted by due date) into consecutive groups by year.
pub fn group_by_year(goals: &[Goal]) -> Vec<GoalGroup> {
  let mut groups: Vec<GoalGroup> = Vec::new();
  for goal in goals {
    let year = goal.due.year();
    match groups.last_mut() {
      Some(group) if group.year == year => group.goals.push(goal.clone()),
      _ => groups.push(GoalGroup { year, goals: vec![goal.clone()] }),
    }
  }
  groups
}

#[cfg(test)]
mod tests {
  use super::*;

  fn goal(id: i64, due: &str, achieved: bool) -> Goal {
    Goal {
      id,
      user_id: 1,
      goal: format!("goal {id}"),
      due: parse_date(due).unwrap(),
      visible_to_public: false,
      achieved,
    }
  }

  #[test]
  fn parse_date_accepts_iso_and_rejects_garbage() {
    assert_eq!(
      parse_date("2025-06-01").unwrap(),
      NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    );
    assert!(matches!(parse_date("not-a-date"), Err(Error::InvalidDate(_))));
    assert!(parse_date("2025-02-30").is_err());
    assert!(parse_date("01.06.2025").is_err());
  }

  #[test]
  fn overdue_ignores_achieved_goals() {
    let today = parse_date("2025-01-10").unwrap();
    assert!(goal(1, "2025-01-09", false).is_overdue(today));
    assert!(!goal(2, "2025-01-09", true).is_overdue(today));
    assert!(!goal(3, "2025-01-10", false).is_overdue(today));
  }

  #[test]
  fn groups_follow_due_year() {
    let goals = vec![
      goal(1, "2024-12-31", false),
      goal(2, "2025-01-01", false),
      goal(3, "2025-07-01", false),
      goal(4, "2027-03-01", false),
    ];
    let groups = group_by_year(&goals);
    let years: Vec<i32> = groups.iter().map(|g| g.year).collect();
    assert_eq!(years, vec![2024, 2025, 2027]);
    assert_eq!(groups[1].goals.len(), 2);
  }

  #[test]
  fn due_str_round_trips_form_value() {
    assert_eq!(goal(1, "2025-06-01", false).due_str(), "2025-06-01");
  }
}
