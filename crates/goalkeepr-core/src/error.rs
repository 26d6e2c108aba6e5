//! Error types for `goalkeepr-core`.

use thiserror::Error;

/// Domain failures a store backend reports by kind rather than as opaque
/// database errors.
#[derive(Debug, Error)]
pub enum Error {
  #[error("email address is already registered")]
  EmailTaken,

  #[error("share limit reached: maximum {0} shares per user")]
  ShareLimitReached(usize),

  #[error("could not allocate a unique public share id")]
  PublicIdExhausted,

  #[error("invalid date {0:?}: expected YYYY-MM-DD")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
