//! Error types and axum `IntoResponse` implementation.
//!
//! Response bodies never carry provider or store detail; the cause is logged
//! instead.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// The provider refused to start a handshake (bad consumer credentials,
  /// callback not allowed, …).
  #[error("authorization rejected: {0}")]
  Authorization(#[source] BoxError),

  /// The provider failed while resolving the identity or paging the timeline.
  #[error("provider error: {0}")]
  Provider(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn authorization(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Authorization(Box::new(e))
  }

  pub fn provider(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Provider(Box::new(e))
  }

  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Store(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    tracing::error!(error = %self, "request failed");
    let (status, message) = match self {
      Error::Authorization(_) => {
        (StatusCode::BAD_GATEWAY, "authorization provider rejected the request")
      }
      Error::Provider(_) => (StatusCode::BAD_GATEWAY, "social provider request failed"),
      Error::Store(_) | Error::Internal(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
