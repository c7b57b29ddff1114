//! Twitter REST client: handshake step one, identity lookup and timeline
//! paging, all behind a wait-on-rate-limit request loop.

use perch_core::provider::{Authorization, SocialProvider, Timeline};
use reqwest::{Client, Method, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::{
  config::{ClientSettings, RateLimitInfo, RateLimitPolicy, TwitterCredentials},
  error::{TwitterError, TwitterResult},
  oauth::{OAuthSigner, Token, parse_request_token},
  types::{ErrorEnvelope, Status, User},
};

const REQUEST_TOKEN_PATH: &str = "/oauth/request_token";
const AUTHORIZE_PATH: &str = "/oauth/authorize";
const VERIFY_CREDENTIALS_PATH: &str = "/1.1/account/verify_credentials.json";
const USER_TIMELINE_PATH: &str = "/1.1/statuses/user_timeline.json";

/// Largest page `statuses/user_timeline` will return.
const PAGE_SIZE: u32 = 200;

/// An OAuth 1.0a client bound to one application and one access token.
///
/// Clones share the inner [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct TwitterClient {
  http:          Client,
  base_url:      String,
  callback_url:  Option<String>,
  signer:        OAuthSigner,
  access_token:  String,
  access_secret: String,
  rate_limit:    RateLimitPolicy,
}

impl TwitterClient {
  /// Build a client signing with all four secrets. Waiting on rate limits
  /// follows `settings.rate_limit` (enabled by default).
  pub fn build_authenticated(
    credentials: &TwitterCredentials,
    settings:    &ClientSettings,
  ) -> TwitterResult<Self> {
    let required = [
      ("consumer key", &credentials.consumer_key),
      ("consumer secret", &credentials.consumer_secret),
      ("access token", &credentials.access_token),
      ("access secret", &credentials.access_secret),
    ];
    if let Some((name, _)) = required.iter().find(|(_, v)| v.is_empty()) {
      return Err(TwitterError::Config(format!("{name} is empty")));
    }

    let http = Client::builder()
      .timeout(settings.timeout)
      .user_agent(concat!("perch/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self {
      http,
      base_url: settings.api_url.trim_end_matches('/').to_string(),
      callback_url: settings.callback_url.clone(),
      signer: OAuthSigner::new(&credentials.consumer_key, &credentials.consumer_secret),
      access_token: credentials.access_token.clone(),
      access_secret: credentials.access_secret.clone(),
      rate_limit: settings.rate_limit.clone(),
    })
  }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  fn access(&self) -> Token<'_> {
    Token { token: &self.access_token, secret: &self.access_secret }
  }

  // ── Handshake ─────────────────────────────────────────────────────────────

  /// Step one of the three-legged flow: obtain a request token (signed with
  /// the consumer pair only) and the URL the user must visit to approve it.
  #[instrument(skip(self))]
  pub async fn request_authorization(&self) -> TwitterResult<Authorization> {
    let callback = self.callback_url.as_deref().unwrap_or("oob");
    let response = self
      .send(Method::POST, REQUEST_TOKEN_PATH, &[], None, &[("oauth_callback", callback)])
      .await?;
    let body = expect_success(response).await?.text().await?;
    let request_token = parse_request_token(&body)?;

    let authorize_url = format!(
      "{}?oauth_token={}",
      self.url(AUTHORIZE_PATH),
      crate::oauth::percent_encode(&request_token.token)
    );
    debug!(%authorize_url, "request token issued");

    Ok(Authorization { request_token, authorize_url })
  }

  // ── REST ──────────────────────────────────────────────────────────────────

  /// `GET account/verify_credentials.json`: the user the access token
  /// belongs to.
  pub async fn verify_credentials(&self) -> TwitterResult<User> {
    self
      .get_json(VERIFY_CREDENTIALS_PATH, &[("skip_status".into(), "true".into())])
      .await
  }

  /// One page of the user's timeline, newest first, at or below `max_id`.
  async fn timeline_page(&self, max_id: Option<i64>) -> TwitterResult<Vec<Status>> {
    let mut params = vec![("count".to_string(), PAGE_SIZE.to_string())];
    if let Some(id) = max_id {
      params.push(("max_id".to_string(), id.to_string()));
    }
    self.get_json(USER_TIMELINE_PATH, &params).await
  }

  /// The complete timeline as a lazy stream. Pages are requested on demand
  /// with the `max_id` cursor until the API returns an empty page.
  pub fn timeline(&self) -> Timeline<'_, TwitterError> {
    Box::pin(async_stream::stream! {
      let mut max_id: Option<i64> = None;
      let mut pages = 0u32;
      loop {
        let page = match self.timeline_page(max_id).await {
          Ok(page) => page,
          Err(e) => {
            yield Err(e);
            return;
          }
        };
        let Some(oldest) = page.last().map(|s| s.id) else {
          debug!(pages, "timeline exhausted");
          return;
        };
        pages += 1;
        for status in page {
          yield status.into_item();
        }
        if oldest <= 1 {
          return;
        }
        max_id = Some(oldest - 1);
      }
    })
  }

  pub async fn fetch_identity_and_timeline(
    &self,
  ) -> TwitterResult<(String, Timeline<'_, TwitterError>)> {
    let user = self.verify_credentials().await?;
    info!(screen_name = %user.screen_name, "resolved authenticated user");
    Ok((user.screen_name, self.timeline()))
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path:   &str,
    params: &[(String, String)],
  ) -> TwitterResult<T> {
    let response = self.send(Method::GET, path, params, Some(self.access()), &[]).await?;
    let bytes = expect_success(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  // ── Transport ─────────────────────────────────────────────────────────────

  /// Sign and send a request. A `429` sleeps until the rate-limit window
  /// resets and retries, without bound, unless waiting is disabled. Every
  /// attempt is signed afresh.
  async fn send(
    &self,
    method:      Method,
    path:        &str,
    params:      &[(String, String)],
    token:       Option<Token<'_>>,
    oauth_extra: &[(&str, &str)],
  ) -> TwitterResult<Response> {
    let url = self.url(path);
    let mut attempt = 0u32;

    loop {
      attempt += 1;
      let auth = self
        .signer
        .authorization_header(method.as_str(), &url, params, token, oauth_extra)?;

      let mut req = self
        .http
        .request(method.clone(), &url)
        .header(header::AUTHORIZATION, auth);
      if !params.is_empty() {
        req = req.query(params);
      }

      debug!(attempt, %method, path, "twitter request");
      let response = req.send().await?;
      if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return Ok(response);
      }

      let wait = RateLimitInfo::from_headers(response.headers()).wait_duration(&self.rate_limit);
      if !self.rate_limit.wait {
        return Err(TwitterError::RateLimited { retry_after: wait.as_secs() });
      }
      warn!(attempt, path, wait_secs = wait.as_secs(), "rate limited; waiting for reset");
      tokio::time::sleep(wait).await;
    }
  }
}

/// Pass successful responses through; turn anything else into
/// [`TwitterError::Api`] with the provider's own message where available.
async fn expect_success(response: Response) -> TwitterResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  let message = serde_json::from_str::<ErrorEnvelope>(&body)
    .ok()
    .and_then(|env| env.errors.into_iter().next())
    .map(|e| e.message)
    .unwrap_or(body);

  Err(TwitterError::Api { status: status.as_u16(), message })
}

impl SocialProvider for TwitterClient {
  type Error = TwitterError;

  async fn request_authorization(&self) -> TwitterResult<Authorization> {
    TwitterClient::request_authorization(self).await
  }

  async fn fetch_identity_and_timeline(
    &self,
  ) -> TwitterResult<(String, Timeline<'_, TwitterError>)> {
    TwitterClient::fetch_identity_and_timeline(self).await
  }
}
