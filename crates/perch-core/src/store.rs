//! The `TimelineStore` trait.
//!
//! Implemented by storage backends (e.g. `perch-store-sqlite`). The HTTP
//! crates depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::Duration;
use uuid::Uuid;

use crate::{
  item::ContentItem,
  principal::Principal,
  provider::RequestToken,
  query::{SortColumn, SortDirection},
  session::Session,
};

/// Abstraction over a perch store backend.
///
/// The backend exclusively owns the lifecycle of its tables; no other layer
/// issues schema statements.
pub trait TimelineStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Drop every table and recreate the schema. All data is lost.
  fn reset(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Content items ─────────────────────────────────────────────────────

  /// Insert `items` in a single transaction and return how many rows were
  /// written. Items whose id already exists are skipped.
  fn insert_items(
    &self,
    items: Vec<ContentItem>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Every item, in ascending id order.
  fn list_items(
    &self,
  ) -> impl Future<Output = Result<Vec<ContentItem>, Self::Error>> + Send + '_;

  /// The lowest-id item whose body equals `body` exactly.
  fn find_item_by_body<'a>(
    &'a self,
    body: &'a str,
  ) -> impl Future<Output = Result<Option<ContentItem>, Self::Error>> + Send + 'a;

  /// Every item ordered by `column` in `direction`; ties broken by id.
  fn sorted_items(
    &self,
    column: SortColumn,
    direction: SortDirection,
  ) -> impl Future<Output = Result<Vec<ContentItem>, Self::Error>> + Send + '_;

  // ── Principals ────────────────────────────────────────────────────────

  /// Return the principal with `identifier`, creating it if absent.
  fn find_or_create_principal<'a>(
    &'a self,
    identifier: &'a str,
  ) -> impl Future<Output = Result<Principal, Self::Error>> + Send + 'a;

  fn get_principal(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Persist a new session that expires `ttl` from now.
  fn create_session(
    &self,
    principal_id: Option<i64>,
    request_token: Option<RequestToken>,
    ttl: Duration,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Look up a session by id. Expired sessions are returned as-is; the
  /// caller decides what to do with them.
  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  fn delete_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every expired session and return how many were removed.
  fn purge_expired_sessions(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
