//! Twitter adapter errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwitterError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("oauth error: {0}")]
  OAuth(String),

  #[error("invalid token response: {0}")]
  InvalidTokenResponse(String),

  #[error("twitter api error {status}: {message}")]
  Api { status: u16, message: String },

  /// Only surfaced when waiting on rate limits is disabled.
  #[error("rate limited, retry after {retry_after} seconds")]
  RateLimited { retry_after: u64 },

  #[error("invalid timestamp {0:?}")]
  InvalidTimestamp(String),

  #[error("configuration error: {0}")]
  Config(String),
}

pub type TwitterResult<T> = Result<T, TwitterError>;
