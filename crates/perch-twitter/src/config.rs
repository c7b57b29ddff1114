//! Client credentials and settings.

use std::{
  fmt,
  time::{Duration, SystemTime, UNIX_EPOCH},
};

use reqwest::header::HeaderMap;

pub const DEFAULT_API_URL: &str = "https://api.twitter.com";

/// The four OAuth 1.0a secrets the client signs with.
#[derive(Clone)]
pub struct TwitterCredentials {
  pub consumer_key:    String,
  pub consumer_secret: String,
  pub access_token:    String,
  pub access_secret:   String,
}

impl fmt::Debug for TwitterCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TwitterCredentials")
      .field("consumer_key", &"<redacted>")
      .field("consumer_secret", &"<redacted>")
      .field("access_token", &"<redacted>")
      .field("access_secret", &"<redacted>")
      .finish()
  }
}

/// What to do when the API answers `429 Too Many Requests`.
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
  /// Sleep until the window resets and retry. When `false` the 429 is
  /// returned as [`TwitterError::RateLimited`](crate::TwitterError::RateLimited).
  pub wait:           bool,
  /// Used when the response carries no `x-rate-limit-reset` header.
  pub fallback_delay: Duration,
  /// Added to every computed wait to absorb clock skew.
  pub padding:        Duration,
}

impl Default for RateLimitPolicy {
  fn default() -> Self {
    Self {
      wait:           true,
      fallback_delay: Duration::from_secs(60),
      padding:        Duration::from_secs(5),
    }
  }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
  /// Base URL for both the OAuth and REST endpoints.
  pub api_url:      String,
  /// `oauth_callback` sent with the request-token call; `oob` when unset.
  pub callback_url: Option<String>,
  pub timeout:      Duration,
  pub rate_limit:   RateLimitPolicy,
}

impl Default for ClientSettings {
  fn default() -> Self {
    Self {
      api_url:      DEFAULT_API_URL.to_string(),
      callback_url: None,
      timeout:      Duration::from_secs(30),
      rate_limit:   RateLimitPolicy::default(),
    }
  }
}

// ─── Rate-limit headers ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RateLimitInfo {
  pub limit:     Option<u32>,
  pub remaining: Option<u32>,
  /// Unix timestamp (seconds) at which the window resets.
  pub reset:     Option<u64>,
}

impl RateLimitInfo {
  pub fn from_headers(headers: &HeaderMap) -> Self {
    let num = |name: &str| {
      headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
    };
    Self {
      limit:     num("x-rate-limit-limit").map(|v: u64| v as u32),
      remaining: num("x-rate-limit-remaining").map(|v: u64| v as u32),
      reset:     num("x-rate-limit-reset"),
    }
  }

  /// How long to wait under `policy`. A reset instant already in the past
  /// yields just the padding.
  pub fn wait_duration(&self, policy: &RateLimitPolicy) -> Duration {
    let base = match self.reset {
      Some(reset) => {
        let now = SystemTime::now()
          .duration_since(UNIX_EPOCH)
          .map(|d| d.as_secs())
          .unwrap_or(0);
        Duration::from_secs(reset.saturating_sub(now))
      }
      None => policy.fallback_delay,
    };
    base + policy.padding
  }
}

#[cfg(test)]
mod tests {
  use reqwest::header::HeaderValue;

  use super::*;

  fn policy() -> RateLimitPolicy {
    RateLimitPolicy {
      wait:           true,
      fallback_delay: Duration::from_secs(60),
      padding:        Duration::from_secs(5),
    }
  }

  #[test]
  fn parses_headers() {
    let mut headers = HeaderMap::new();
    headers.insert("x-rate-limit-limit", HeaderValue::from_static("900"));
    headers.insert("x-rate-limit-remaining", HeaderValue::from_static("0"));
    headers.insert("x-rate-limit-reset", HeaderValue::from_static("1700000000"));

    let info = RateLimitInfo::from_headers(&headers);
    assert_eq!(info.limit, Some(900));
    assert_eq!(info.remaining, Some(0));
    assert_eq!(info.reset, Some(1_700_000_000));
  }

  #[test]
  fn missing_reset_uses_fallback() {
    let info = RateLimitInfo::default();
    assert_eq!(info.wait_duration(&policy()), Duration::from_secs(65));
  }

  #[test]
  fn past_reset_waits_only_padding() {
    let info = RateLimitInfo { reset: Some(1), ..Default::default() };
    assert_eq!(info.wait_duration(&policy()), Duration::from_secs(5));
  }

  #[test]
  fn debug_redacts_secrets() {
    let creds = TwitterCredentials {
      consumer_key:    "ck-value".into(),
      consumer_secret: "cs-value".into(),
      access_token:    "at-value".into(),
      access_secret:   "as-value".into(),
    };
    let dbg = format!("{creds:?}");
    assert!(!dbg.contains("-value"), "{dbg}");
  }
}
