//! Per-user branding shown on public share pages.

use serde::{Deserialize, Serialize};

pub const MAX_TITLE_CHARS: usize = 512;
pub const MAX_DESCRIPTION_CHARS: usize = 2048;

/// One row per user; absent fields fall back to defaults when rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
  pub user_id:     i64,
  pub title:       Option<String>,
  pub description: Option<String>,
}
