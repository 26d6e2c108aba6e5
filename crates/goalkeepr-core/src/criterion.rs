//! Success criteria: the checklist attached to a goal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted criterion description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessCriterion {
  pub id:          i64,
  pub goal_id:     i64,
  pub user_id:     i64,
  /// HTML-escaped at input time.
  pub description: String,
  pub completed:   bool,
  /// Manual ordering within the goal; unset entries sort last.
  pub position:    Option<i64>,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CriterionInput {
  pub description: String,
  pub completed:   bool,
  pub position:    Option<i64>,
}

/// Completed and total counts, for progress display.
pub fn progress(criteria: &[SuccessCriterion]) -> (usize, usize) {
  let done = criteria.iter().filter(|c| c.completed).count();
  (done, criteria.len())
}
