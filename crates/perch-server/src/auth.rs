//! OAuth handshake endpoints.
//!
//! `GET /twitter_auth` starts the handshake and parks the request token in a
//! fresh pending session. `GET /app` is the provider callback: it ingests the
//! timeline, binds the session to a principal and lands on the listing.

use axum::{
  extract::{Query, State},
  http::HeaderMap,
  response::{IntoResponse, Redirect, Response},
};
use perch_core::{provider::SocialProvider, store::TimelineStore};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
  AppState,
  error::Error,
  ingest::ingest,
  session::{load_session, redirect_with_session, session_id},
};

pub const AUTH_START: &str = "/twitter_auth";
pub const CALLBACK: &str = "/app";
pub const LANDING: &str = "/data";

/// `GET /twitter_auth`
pub async fn start<S, P>(
  State(state): State<AppState<S, P>>,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: TimelineStore + 'static,
  P: SocialProvider + 'static,
{
  let authorization = state
    .provider
    .request_authorization()
    .await
    .map_err(Error::authorization)?;

  if let Some(previous) = session_id(&state.session_key, &headers) {
    state.store.delete_session(previous).await.map_err(Error::store)?;
  }

  let session = state
    .store
    .create_session(None, Some(authorization.request_token), state.config.session_ttl())
    .await
    .map_err(Error::store)?;

  info!(session = %session.session_id, "handshake started");
  redirect_with_session(&state, &authorization.authorize_url, &session)
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
  pub oauth_token:    Option<String>,
  pub oauth_verifier: Option<String>,
}

/// `GET /app?oauth_token=…&oauth_verifier=…`
pub async fn callback<S, P>(
  State(state): State<AppState<S, P>>,
  headers: HeaderMap,
  Query(params): Query<CallbackParams>,
) -> Result<Response, Error>
where
  S: TimelineStore + 'static,
  P: SocialProvider + 'static,
{
  let (Some(token), Some(_verifier)) =
    (non_empty(params.oauth_token), non_empty(params.oauth_verifier))
  else {
    info!("callback without token and verifier, restarting handshake");
    return Ok(Redirect::to(AUTH_START).into_response());
  };

  let pending = load_session(&*state.store, &state.session_key, &headers).await?;
  match pending.as_ref().and_then(|s| s.request_token.as_ref()) {
    Some(issued) if issued.token != token => {
      warn!("callback token does not match the pending request token");
    }
    None => warn!("callback without a pending handshake session"),
    Some(_) => {}
  }

  let ingested = ingest(&*state.store, &*state.provider).await?;
  let principal = state
    .store
    .find_or_create_principal(&ingested.identifier)
    .await
    .map_err(Error::store)?;

  if let Some(pending) = pending {
    state.store.delete_session(pending.session_id).await.map_err(Error::store)?;
  }
  let session = state
    .store
    .create_session(Some(principal.id), None, state.config.session_ttl())
    .await
    .map_err(Error::store)?;

  info!(
    identifier = %principal.identifier,
    fetched = ingested.fetched,
    inserted = ingested.inserted,
    "logged in"
  );
  redirect_with_session(&state, LANDING, &session)
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}
