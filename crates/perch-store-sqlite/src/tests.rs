//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, TimeZone, Utc};
use perch_core::{
  item::ContentItem,
  provider::RequestToken,
  query::{SortColumn, SortDirection},
  session::AuthState,
  store::TimelineStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn item(id: i64, body: &str, minute: u32) -> ContentItem {
  ContentItem {
    id,
    body:       body.into(),
    created_at: Utc.with_ymd_and_hms(2021, 3, 14, 12, minute, 0).unwrap(),
  }
}

fn ids(items: &[ContentItem]) -> Vec<i64> {
  items.iter().map(|i| i.id).collect()
}

// ─── Content items ───────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_empty_before_ingestion() {
  let s = store().await;
  assert!(s.list_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_and_list() {
  let s = store().await;
  let inserted = s
    .insert_items(vec![item(3, "c", 1), item(1, "a", 3), item(2, "b", 2)])
    .await
    .unwrap();
  assert_eq!(inserted, 3);

  let all = s.list_items().await.unwrap();
  assert_eq!(ids(&all), vec![1, 2, 3]);
  assert_eq!(all[0], item(1, "a", 3));
}

#[tokio::test]
async fn duplicate_ids_are_skipped() {
  let s = store().await;
  s.insert_items(vec![item(1, "a", 0), item(2, "b", 1)]).await.unwrap();

  let inserted = s
    .insert_items(vec![item(2, "changed", 5), item(3, "c", 2)])
    .await
    .unwrap();
  assert_eq!(inserted, 1);

  let all = s.list_items().await.unwrap();
  assert_eq!(ids(&all), vec![1, 2, 3]);
  // Existing rows are never updated.
  assert_eq!(all[1].body, "b");
}

#[tokio::test]
async fn find_by_body_is_exact() {
  let s = store().await;
  s.insert_items(vec![item(1, "hello world", 0), item(2, "hello", 1)])
    .await
    .unwrap();

  let hit = s.find_item_by_body("hello").await.unwrap().unwrap();
  assert_eq!(hit, item(2, "hello", 1));

  assert!(s.find_item_by_body("hell").await.unwrap().is_none());
  assert!(s.find_item_by_body("HELLO").await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_body_returns_lowest_id() {
  let s = store().await;
  s.insert_items(vec![item(9, "same", 0), item(4, "same", 1)])
    .await
    .unwrap();
  assert_eq!(s.find_item_by_body("same").await.unwrap().unwrap().id, 4);
}

#[tokio::test]
async fn sort_by_each_column() {
  let s = store().await;
  s.insert_items(vec![item(1, "b", 30), item(2, "c", 10), item(3, "a", 20)])
    .await
    .unwrap();

  let by = |c, d| {
    let s = s.clone();
    async move { ids(&s.sorted_items(c, d).await.unwrap()) }
  };

  assert_eq!(by(SortColumn::Id, SortDirection::Asc).await, vec![1, 2, 3]);
  assert_eq!(by(SortColumn::Id, SortDirection::Desc).await, vec![3, 2, 1]);
  assert_eq!(by(SortColumn::Body, SortDirection::Asc).await, vec![3, 1, 2]);
  assert_eq!(by(SortColumn::Body, SortDirection::Desc).await, vec![2, 1, 3]);
  assert_eq!(by(SortColumn::CreatedAt, SortDirection::Asc).await, vec![2, 3, 1]);
  assert_eq!(by(SortColumn::CreatedAt, SortDirection::Desc).await, vec![1, 3, 2]);
}

#[tokio::test]
async fn sort_ties_break_on_id() {
  let s = store().await;
  s.insert_items(vec![item(5, "x", 0), item(2, "x", 0), item(7, "a", 0)])
    .await
    .unwrap();

  let asc = s.sorted_items(SortColumn::Body, SortDirection::Asc).await.unwrap();
  assert_eq!(ids(&asc), vec![7, 2, 5]);

  let desc = s.sorted_items(SortColumn::CreatedAt, SortDirection::Desc).await.unwrap();
  assert_eq!(ids(&desc), vec![7, 5, 2]);
}

#[tokio::test]
async fn sub_second_timestamps_sort_chronologically() {
  let s = store().await;
  let base = Utc.with_ymd_and_hms(2021, 3, 14, 12, 0, 0).unwrap();
  s.insert_items(vec![
    ContentItem { id: 1, body: "later".into(), created_at: base + Duration::milliseconds(250) },
    ContentItem { id: 2, body: "earlier".into(), created_at: base },
  ])
  .await
  .unwrap();

  let asc = s.sorted_items(SortColumn::CreatedAt, SortDirection::Asc).await.unwrap();
  assert_eq!(ids(&asc), vec![2, 1]);
  assert_eq!(asc[1].created_at, base + Duration::milliseconds(250));
}

// ─── Principals ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_or_create_principal_is_idempotent() {
  let s = store().await;
  let first = s.find_or_create_principal("alice").await.unwrap();
  let again = s.find_or_create_principal("alice").await.unwrap();
  let other = s.find_or_create_principal("bob").await.unwrap();

  assert_eq!(first, again);
  assert_eq!(first.identifier, "alice");
  assert_ne!(first.id, other.id);

  let fetched = s.get_principal(first.id).await.unwrap();
  assert_eq!(fetched, Some(first));
}

#[tokio::test]
async fn get_principal_missing_returns_none() {
  let s = store().await;
  assert!(s.get_principal(42).await.unwrap().is_none());
}

// ─── Sessions ────────────────────────────────────────────────────────────────

fn token() -> RequestToken {
  RequestToken { token: "req-token".into(), token_secret: "req-secret".into() }
}

#[tokio::test]
async fn pending_session_round_trips_request_token() {
  let s = store().await;
  let created = s
    .create_session(None, Some(token()), Duration::hours(1))
    .await
    .unwrap();
  assert_eq!(created.state(), AuthState::PendingVerification);

  let fetched = s.get_session(created.session_id).await.unwrap().unwrap();
  assert_eq!(fetched.request_token, Some(token()));
  assert_eq!(fetched.principal_id, None);
  assert_eq!(fetched.expires_at, created.expires_at);
}

#[tokio::test]
async fn created_session_equals_stored_row() {
  let s = store().await;
  let alice = s.find_or_create_principal("alice").await.unwrap();
  for (principal_id, request_token) in [(None, Some(token())), (Some(alice.id), None)] {
    let created = s
      .create_session(principal_id, request_token, Duration::hours(1))
      .await
      .unwrap();
    let fetched = s.get_session(created.session_id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
  }
}

#[tokio::test]
async fn authenticated_session_binds_principal() {
  let s = store().await;
  let alice = s.find_or_create_principal("alice").await.unwrap();
  let created = s
    .create_session(Some(alice.id), None, Duration::hours(1))
    .await
    .unwrap();

  let fetched = s.get_session(created.session_id).await.unwrap().unwrap();
  assert_eq!(fetched.state(), AuthState::Authenticated);
  assert_eq!(fetched.principal_id, Some(alice.id));
}

#[tokio::test]
async fn get_session_missing_returns_none() {
  let s = store().await;
  assert!(s.get_session(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_session() {
  let s = store().await;
  let created = s.create_session(None, None, Duration::hours(1)).await.unwrap();
  s.delete_session(created.session_id).await.unwrap();
  assert!(s.get_session(created.session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn purge_removes_only_expired_sessions() {
  let s = store().await;
  let live = s.create_session(None, None, Duration::hours(1)).await.unwrap();
  let dead = s.create_session(None, None, Duration::seconds(-1)).await.unwrap();

  assert_eq!(s.purge_expired_sessions().await.unwrap(), 1);
  assert!(s.get_session(live.session_id).await.unwrap().is_some());
  assert!(s.get_session(dead.session_id).await.unwrap().is_none());
}

// ─── Reset ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_drops_everything() {
  let s = store().await;
  s.insert_items(vec![item(1, "a", 0)]).await.unwrap();
  let alice = s.find_or_create_principal("alice").await.unwrap();
  let session = s
    .create_session(Some(alice.id), None, Duration::hours(1))
    .await
    .unwrap();

  s.reset().await.unwrap();

  assert!(s.list_items().await.unwrap().is_empty());
  assert!(s.get_principal(alice.id).await.unwrap().is_none());
  assert!(s.get_session(session.session_id).await.unwrap().is_none());

  // The schema is usable again straight away.
  s.insert_items(vec![item(1, "a", 0)]).await.unwrap();
  assert_eq!(s.list_items().await.unwrap().len(), 1);
}
