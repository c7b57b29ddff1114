//! Signed session cookies and the login guard.
//!
//! The browser holds `perch_session=<uuid>.<hex hmac-sha256(uuid)>`. The
//! session itself (pending request token or bound principal) lives in the
//! store; a cookie whose signature does not verify is treated as absent.

use std::fmt;

use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, header},
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use hmac::{Hmac, Mac, digest::InvalidLength};
use perch_core::{principal::Principal, provider::SocialProvider, session::Session, store::TimelineStore};
use sha2::Sha256;
use uuid::Uuid;

use crate::{AppState, auth::AUTH_START, error::Error};

pub const COOKIE_NAME: &str = "perch_session";

type HmacSha256 = Hmac<Sha256>;

// ─── Signing ─────────────────────────────────────────────────────────────────

/// HMAC-SHA256 key for session cookies.
#[derive(Clone)]
pub struct SessionKey {
  mac: HmacSha256,
}

impl fmt::Debug for SessionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SessionKey(<redacted>)")
  }
}

impl SessionKey {
  pub fn new(secret: &[u8]) -> Result<Self, InvalidLength> {
    Ok(Self { mac: HmacSha256::new_from_slice(secret)? })
  }

  /// `<uuid>.<hex signature>`
  pub fn sign(&self, id: Uuid) -> String {
    let mut mac = self.mac.clone();
    mac.update(id.as_bytes());
    format!("{id}.{}", hex::encode(mac.finalize().into_bytes()))
  }

  /// Return the session id if `value` carries a valid signature.
  pub fn verify(&self, value: &str) -> Option<Uuid> {
    let (id, signature) = value.split_once('.')?;
    let id = Uuid::parse_str(id).ok()?;
    let signature = hex::decode(signature).ok()?;
    let mut mac = self.mac.clone();
    mac.update(id.as_bytes());
    mac.verify_slice(&signature).ok()?;
    Some(id)
  }
}

// ─── Cookies ─────────────────────────────────────────────────────────────────

/// The verified session id named by the request's cookie, if any.
pub fn session_id(key: &SessionKey, headers: &HeaderMap) -> Option<Uuid> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|value| value.to_str().ok())
    .flat_map(|value| value.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == COOKIE_NAME)
    .and_then(|(_, value)| key.verify(value))
}

/// Build the `Set-Cookie` value for `session`.
pub fn set_cookie(
  key: &SessionKey,
  session: &Session,
  max_age: u64,
  secure: bool,
) -> Result<HeaderValue, Error> {
  let mut cookie = format!(
    "{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
    key.sign(session.session_id),
  );
  if secure {
    cookie.push_str("; Secure");
  }
  HeaderValue::from_str(&cookie).map_err(|e| Error::Internal(e.to_string()))
}

/// Redirect to `location` while handing the browser the cookie for `session`.
pub fn redirect_with_session<S, P>(
  state: &AppState<S, P>,
  location: &str,
  session: &Session,
) -> Result<Response, Error> {
  let cookie = set_cookie(
    &state.session_key,
    session,
    state.config.cookie_max_age(),
    state.config.secure_cookie,
  )?;
  let mut response = Redirect::to(location).into_response();
  response.headers_mut().insert(header::SET_COOKIE, cookie);
  Ok(response)
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Load the live session named by the request's cookie.
///
/// Expired sessions are deleted and reported as absent.
pub async fn load_session<S>(
  store: &S,
  key: &SessionKey,
  headers: &HeaderMap,
) -> Result<Option<Session>, Error>
where
  S: TimelineStore,
{
  let Some(id) = session_id(key, headers) else {
    return Ok(None);
  };
  let Some(session) = store.get_session(id).await.map_err(Error::store)? else {
    return Ok(None);
  };
  if session.is_expired_at(chrono::Utc::now()) {
    tracing::debug!(session = %id, "expired session presented");
    store.delete_session(id).await.map_err(Error::store)?;
    return Ok(None);
  }
  Ok(Some(session))
}

/// The principal the request is logged in as, if any.
pub async fn current_principal<S>(
  store: &S,
  key: &SessionKey,
  headers: &HeaderMap,
) -> Result<Option<Principal>, Error>
where
  S: TimelineStore,
{
  let Some(principal_id) = load_session(store, key, headers)
    .await?
    .and_then(|session| session.principal_id)
  else {
    return Ok(None);
  };
  store.get_principal(principal_id).await.map_err(Error::store)
}

// ─── Guard ───────────────────────────────────────────────────────────────────

/// Middleware that admits only authenticated sessions.
///
/// Anyone else is redirected to the start of the handshake. On success the
/// [`Principal`] is available to handlers as a request extension.
pub async fn require_principal<S, P>(
  State(state): State<AppState<S, P>>,
  mut req: Request,
  next: Next,
) -> Response
where
  S: TimelineStore + 'static,
  P: SocialProvider + 'static,
{
  match current_principal(&*state.store, &state.session_key, req.headers()).await {
    Ok(Some(principal)) => {
      req.extensions_mut().insert(principal);
      next.run(req).await
    }
    Ok(None) => {
      tracing::debug!(path = %req.uri().path(), "no authenticated session");
      Redirect::to(AUTH_START).into_response()
    }
    Err(e) => e.into_response(),
  }
}
