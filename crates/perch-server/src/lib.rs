//! HTTP server for perch.
//!
//! Ties the OAuth handshake, timeline ingestion and the read API together
//! behind one axum [`Router`], backed by any [`TimelineStore`] and any
//! [`SocialProvider`].

pub mod auth;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::{Secrets, ServerConfig};
pub use error::Error;

use std::sync::Arc;

use axum::{
  Router, middleware,
  response::Redirect,
  routing::get,
};
use perch_core::{provider::SocialProvider, store::TimelineStore};
use tower_http::trace::TraceLayer;

use session::SessionKey;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, P> {
  pub store:       Arc<S>,
  pub provider:    Arc<P>,
  pub session_key: Arc<SessionKey>,
  pub config:      Arc<ServerConfig>,
}

impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      provider:    Arc::clone(&self.provider),
      session_key: Arc::clone(&self.session_key),
      config:      Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
///
/// The read API from `perch-api` is mounted behind
/// [`session::require_principal`]; the handshake routes are public.
pub fn router<S, P>(state: AppState<S, P>) -> Router
where
  S: TimelineStore + 'static,
  P: SocialProvider + 'static,
{
  let guard = middleware::from_fn_with_state(
    state.clone(),
    session::require_principal::<S, P>,
  );
  let api = perch_api::api_router(Arc::clone(&state.store)).route_layer(guard);

  Router::new()
    .route("/",                get(|| async { Redirect::to(auth::AUTH_START) }))
    .route(auth::AUTH_START,   get(auth::start::<S, P>))
    .route(auth::CALLBACK,     get(auth::callback::<S, P>))
    .with_state(state)
    .merge(api)
    .layer(TraceLayer::new_for_http())
}
