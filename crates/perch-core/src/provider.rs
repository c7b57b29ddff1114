//! The `SocialProvider` trait: the seam between the HTTP layer and the
//! remote social network.
//!
//! Implemented by `perch-twitter`. The server only depends on this trait, so
//! it can be exercised against an in-process fake.

use std::future::Future;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::item::ContentItem;

/// The one-time token pair issued in the first step of the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
  pub token:        String,
  pub token_secret: String,
}

/// Result of starting a handshake: the token to remember and the URL to send
/// the browser to.
#[derive(Debug, Clone)]
pub struct Authorization {
  pub request_token: RequestToken,
  pub authorize_url: String,
}

/// A lazy, finite, non-restartable sequence of timeline items.
pub type Timeline<'a, E> = BoxStream<'a, Result<ContentItem, E>>;

pub trait SocialProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Obtain a request token and the provider's authorization URL.
  fn request_authorization(
    &self,
  ) -> impl Future<Output = Result<Authorization, Self::Error>> + Send + '_;

  /// Resolve the authenticated identity's display identifier and open its
  /// complete timeline. Items are fetched page by page as the stream is
  /// polled.
  fn fetch_identity_and_timeline(
    &self,
  ) -> impl Future<Output = Result<(String, Timeline<'_, Self::Error>), Self::Error>>
  + Send
  + '_;
}
