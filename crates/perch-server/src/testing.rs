//! In-process [`SocialProvider`] for handler and ingestion tests.

use chrono::{TimeZone, Utc};
use futures::StreamExt as _;
use perch_core::{
  item::ContentItem,
  provider::{Authorization, RequestToken, SocialProvider, Timeline},
};

#[derive(Debug, thiserror::Error)]
#[error("fake provider failure")]
pub struct FakeError;

pub struct FakeProvider {
  identifier:         String,
  items:              Vec<ContentItem>,
  fail_authorization: bool,
  fail_after:         Option<usize>,
}

pub const REQUEST_TOKEN: &str = "request-token";
pub const AUTHORIZE_URL: &str = "https://provider.test/oauth/authorize?oauth_token=request-token";

impl FakeProvider {
  pub fn new(identifier: &str, items: Vec<ContentItem>) -> Self {
    Self {
      identifier: identifier.to_string(),
      items,
      fail_authorization: false,
      fail_after: None,
    }
  }

  pub fn rejecting_authorization(mut self) -> Self {
    self.fail_authorization = true;
    self
  }

  /// Yield `n` items, then an error.
  pub fn failing_after(mut self, n: usize) -> Self {
    self.fail_after = Some(n);
    self
  }
}

impl SocialProvider for FakeProvider {
  type Error = FakeError;

  async fn request_authorization(&self) -> Result<Authorization, FakeError> {
    if self.fail_authorization {
      return Err(FakeError);
    }
    Ok(Authorization {
      request_token: RequestToken {
        token:        REQUEST_TOKEN.to_string(),
        token_secret: "request-secret".to_string(),
      },
      authorize_url: AUTHORIZE_URL.to_string(),
    })
  }

  async fn fetch_identity_and_timeline(
    &self,
  ) -> Result<(String, Timeline<'_, FakeError>), FakeError> {
    let mut results: Vec<Result<ContentItem, FakeError>> =
      self.items.iter().cloned().map(Ok).collect();
    if let Some(n) = self.fail_after {
      results.truncate(n);
      results.push(Err(FakeError));
    }
    Ok((self.identifier.clone(), futures::stream::iter(results).boxed()))
  }
}

/// Items with the given ids, one minute apart.
pub fn items(ids: &[i64]) -> Vec<ContentItem> {
  ids
    .iter()
    .map(|&id| ContentItem {
      id,
      body: format!("post {id}"),
      created_at: Utc.with_ymd_and_hms(2021, 6, 1, 12, id as u32 % 60, 0).unwrap(),
    })
    .collect()
}
