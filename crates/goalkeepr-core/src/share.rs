//! Share links: random public ids that expose a user's public goals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Active share links a single user may hold.
pub const MAX_SHARES_PER_USER: usize = 10;

/// Random bytes behind each public id; the id is their hex encoding.
pub const PUBLIC_ID_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
  pub id:         i64,
  pub user_id:    i64,
  pub public_id:  String,
  pub created_at: DateTime<Utc>,
}

impl Share {
  /// Path of the public page for this link.
  pub fn path(&self) -> String { format!("/s/{}", self.public_id) }
}
