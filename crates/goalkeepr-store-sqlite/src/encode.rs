//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, due dates as `YYYY-MM-DD` and
//! booleans as integer 0/1.

use chrono::{DateTime, NaiveDate, Utc};
use goalkeepr_core::{
  criterion::SuccessCriterion,
  goal::{DATE_FORMAT, Goal},
  share::Share,
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "id, email, password_hash, locked_until, created_at, updated_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub email:         String,
  pub password_hash: String,
  pub locked_until:  Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      locked_until:  row.get(3)?,
      created_at:    row.get(4)?,
      updated_at:    row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      email:         self.email,
      password_hash: self.password_hash,
      locked_until:  self.locked_until.as_deref().map(decode_dt).transpose()?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub const GOAL_COLUMNS: &str =
  "id, user_id, goal, due, visible_to_public, achieved";

pub struct RawGoal {
  pub id:                i64,
  pub user_id:           i64,
  pub goal:              String,
  pub due:               String,
  pub visible_to_public: bool,
  pub achieved:          bool,
}

impl RawGoal {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      user_id:           row.get(1)?,
      goal:              row.get(2)?,
      due:               row.get(3)?,
      visible_to_public: row.get(4)?,
      achieved:          row.get(5)?,
    })
  }

  pub fn into_goal(self) -> Result<Goal> {
    Ok(Goal {
      id:                self.id,
      user_id:           self.user_id,
      goal:              self.goal,
      due:               decode_date(&self.due)?,
      visible_to_public: self.visible_to_public,
      achieved:          self.achieved,
    })
  }
}

pub const CRITERION_COLUMNS: &str =
  "id, goal_id, user_id, description, completed, position, created_at";

pub struct RawCriterion {
  pub id:          i64,
  pub goal_id:     i64,
  pub user_id:     i64,
  pub description: String,
  pub completed:   bool,
  pub position:    Option<i64>,
  pub created_at:  String,
}

impl RawCriterion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      goal_id:     row.get(1)?,
      user_id:     row.get(2)?,
      description: row.get(3)?,
      completed:   row.get(4)?,
      position:    row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_criterion(self) -> Result<SuccessCriterion> {
    Ok(SuccessCriterion {
      id:          self.id,
      goal_id:     self.goal_id,
      user_id:     self.user_id,
      description: self.description,
      completed:   self.completed,
      position:    self.position,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const SHARE_COLUMNS: &str = "id, user_id, public_id, created_at";

pub struct RawShare {
  pub id:         i64,
  pub user_id:    i64,
  pub public_id:  String,
  pub created_at: String,
}

impl RawShare {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      public_id:  row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_share(self) -> Result<Share> {
    Ok(Share {
      id:         self.id,
      user_id:    self.user_id,
      public_id:  self.public_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Empty and whitespace-only strings are stored as NULL.
pub fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}
