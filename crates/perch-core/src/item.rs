//! Content items, one ingested unit of timeline content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timeline item as stored locally.
///
/// `id` is the provider's own item id, reused as the primary key. Items are
/// written once during ingestion and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
  pub id:         i64,
  pub body:       String,
  pub created_at: DateTime<Utc>,
}
