//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The password is only ever held as an argon2 PHC
/// string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:            i64,
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub locked_until:  Option<DateTime<Utc>>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl User {
  /// Whether sign-in is currently refused for this account.
  pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
    self.locked_until.is_some_and(|until| until > now)
  }
}

/// Input for [`crate::store::GoalkeeprStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  /// Already trimmed and lowercased.
  pub email:         String,
  pub password_hash: String,
}
