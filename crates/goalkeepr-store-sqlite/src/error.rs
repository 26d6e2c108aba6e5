//! Error type for `goalkeepr-store-sqlite`.

use goalkeepr_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] goalkeepr_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl StoreError for Error {
  fn domain(&self) -> Option<&goalkeepr_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}
