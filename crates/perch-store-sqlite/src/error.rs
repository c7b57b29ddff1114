//! Error type for `perch-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A row that should exist right after being written could not be read.
  #[error("principal {0:?} vanished after insert")]
  PrincipalMissing(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
