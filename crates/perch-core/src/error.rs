//! Error types for `perch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown sort column: {0:?}")]
  UnknownSortColumn(String),

  #[error("unknown sort direction: {0:?}")]
  UnknownSortDirection(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
