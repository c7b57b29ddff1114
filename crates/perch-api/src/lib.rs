//! JSON read API over ingested timeline items.
//!
//! Exposes an axum [`Router`] backed by any [`perch_core::store::TimelineStore`].
//! Session checks are the caller's responsibility; `perch-server` wraps this
//! router in its login guard.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(perch_api::api_router(store.clone()).route_layer(guard))
//! ```

pub mod error;
pub mod items;

use std::sync::Arc;

use axum::{Router, routing::get};
use perch_core::store::TimelineStore;

pub use error::ApiError;

/// Build the read API router for `store`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: TimelineStore + 'static,
{
  Router::new()
    .route("/data", get(items::list::<S>))
    .route("/search", get(items::search::<S>))
    .route("/sort", get(items::sort::<S>))
    .with_state(store)
}
