//! Handlers for the item endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/data` | `{"data": [item…]}` in ascending id order |
//! | `GET`  | `/search` | `?search=<text>`; exact body match, 404 if none |
//! | `GET`  | `/sort` | `?column_name=id\|body\|created_at&sort=asc\|desc` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use perch_core::{
  item::ContentItem,
  query::{SortColumn, SortDirection},
  store::TimelineStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemList {
  pub data: Vec<ContentItem>,
}

/// `GET /data`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<ItemList>, ApiError>
where
  S: TimelineStore,
{
  let data = store.list_items().await.map_err(ApiError::store)?;
  tracing::info!(count = data.len(), "listed all timeline items");
  Ok(Json(ItemList { data }))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub search: Option<String>,
}

/// `GET /search?search=<text>`
pub async fn search<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<ContentItem>, ApiError>
where
  S: TimelineStore,
{
  let text = params
    .search
    .ok_or_else(|| ApiError::BadRequest("missing `search` parameter".into()))?;

  let item = store
    .find_item_by_body(&text)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("no item with that body".into()))?;
  Ok(Json(item))
}

// ─── Sort ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SortParams {
  pub column_name: Option<String>,
  pub sort:        Option<String>,
}

/// `GET /sort?column_name=<column>&sort=asc|desc`
///
/// Unknown or missing parameters are a 400; a failing store is a 500.
pub async fn sort<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SortParams>,
) -> Result<Json<Vec<ContentItem>>, ApiError>
where
  S: TimelineStore,
{
  let (column, direction) = parse_sort(&params).map_err(|reason| {
    tracing::info!(?params, %reason, "rejected sort parameters");
    ApiError::BadRequest(INVALID_SORT.into())
  })?;

  let items = store
    .sorted_items(column, direction)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(%column, %direction, count = items.len(), "sorted timeline items");
  Ok(Json(items))
}

/// Returned for every rejected sort request; the caller's input is not echoed.
const INVALID_SORT: &str = "invalid sort parameters";

fn parse_sort(params: &SortParams) -> Result<(SortColumn, SortDirection), String> {
  let column = params
    .column_name
    .as_deref()
    .ok_or("missing `column_name` parameter")?;
  let direction = params.sort.as_deref().ok_or("missing `sort` parameter")?;
  let column = SortColumn::parse(column).map_err(|e| e.to_string())?;
  let direction = SortDirection::parse(direction).map_err(|e| e.to_string())?;
  Ok((column, direction))
}
