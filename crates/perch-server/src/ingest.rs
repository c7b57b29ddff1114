//! Pull the authenticated identity's timeline into the store.

use futures::TryStreamExt as _;
use perch_core::{provider::SocialProvider, store::TimelineStore};

use crate::error::Error;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
  pub identifier: String,
  pub fetched:    usize,
  /// Rows actually written; ids already present are skipped.
  pub inserted:   usize,
}

/// Drain the provider's timeline into memory, then write it in one
/// transaction. A fetch failure leaves the store untouched.
pub async fn ingest<S, P>(store: &S, provider: &P) -> Result<Ingested, Error>
where
  S: TimelineStore,
  P: SocialProvider,
{
  let (identifier, timeline) = provider
    .fetch_identity_and_timeline()
    .await
    .map_err(Error::provider)?;

  let staged: Vec<_> = timeline.try_collect().await.map_err(Error::provider)?;
  let fetched = staged.len();
  tracing::debug!(%identifier, fetched, "timeline drained");

  let inserted = store.insert_items(staged).await.map_err(Error::store)?;
  tracing::info!(%identifier, fetched, inserted, "timeline ingested");

  Ok(Ingested { identifier, fetched, inserted })
}
