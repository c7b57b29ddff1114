//! Server-side login sessions and the handshake state they carry.
//!
//! A browser holds only a signed reference to a [`Session`]; everything else
//! lives in the store. The handshake state is derived from which fields are
//! populated rather than stored separately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::RequestToken;

/// Where a session sits in the OAuth handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
  /// No handshake in progress and no principal bound.
  Unauthenticated,
  /// A request token was issued; waiting for the provider callback.
  PendingVerification,
  /// Bound to a principal.
  Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub session_id:    Uuid,
  pub principal_id:  Option<i64>,
  pub request_token: Option<RequestToken>,
  pub created_at:    DateTime<Utc>,
  pub expires_at:    DateTime<Utc>,
}

impl Session {
  pub fn state(&self) -> AuthState {
    match (&self.principal_id, &self.request_token) {
      (Some(_), _) => AuthState::Authenticated,
      (None, Some(_)) => AuthState::PendingVerification,
      (None, None) => AuthState::Unauthenticated,
    }
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    self.expires_at <= now
  }
}
