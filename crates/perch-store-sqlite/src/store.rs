//! [`SqliteStore`], the SQLite implementation of [`TimelineStore`].

use std::path::Path;

use chrono::{Duration, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use perch_core::{
  item::ContentItem,
  principal::Principal,
  provider::RequestToken,
  query::{SortColumn, SortDirection},
  session::Session,
  store::TimelineStore,
};

use crate::{
  Error, Result,
  encode::{RawItem, RawSession, encode_dt, encode_uuid, principal_from_row},
  schema::{RESET, SCHEMA},
};

const ITEM_COLUMNS: &str = "id, body, created_at";

const SESSION_COLUMNS: &str =
  "session_id, principal_id, request_token, request_token_secret, created_at, expires_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A perch store backed by a single SQLite file.
///
/// Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  /// Existing data is kept.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a store backed by an in-memory database.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_items(&self, sql: String) -> Result<Vec<ContentItem>> {
    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }
}

// ─── TimelineStore impl ──────────────────────────────────────────────────────

impl TimelineStore for SqliteStore {
  type Error = Error;

  async fn reset(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(RESET)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::warn!("store reset: all tables dropped and recreated");
    Ok(())
  }

  // ── Content items ─────────────────────────────────────────────────────────

  async fn insert_items(&self, items: Vec<ContentItem>) -> Result<usize> {
    let rows: Vec<(i64, String, String)> = items
      .into_iter()
      .map(|item| (item.id, item.body, encode_dt(item.created_at)))
      .collect();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO content_items (id, body, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO NOTHING",
          )?;
          for (id, body, created_at) in &rows {
            inserted += stmt.execute(rusqlite::params![id, body, created_at])?;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    Ok(inserted)
  }

  async fn list_items(&self) -> Result<Vec<ContentItem>> {
    self
      .query_items(format!("SELECT {ITEM_COLUMNS} FROM content_items ORDER BY id"))
      .await
  }

  async fn find_item_by_body(&self, body: &str) -> Result<Option<ContentItem>> {
    let body = body.to_owned();

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {ITEM_COLUMNS} FROM content_items WHERE body = ?1 ORDER BY id LIMIT 1"
            ),
            rusqlite::params![body],
            RawItem::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn sorted_items(
    &self,
    column:    SortColumn,
    direction: SortDirection,
  ) -> Result<Vec<ContentItem>> {
    // Both fragments come from closed enums, never from request text.
    let col = column.column();
    let dir = direction.keyword();
    let order = if column == SortColumn::Id {
      format!("id {dir}")
    } else {
      format!("{col} {dir}, id {dir}")
    };

    self
      .query_items(format!("SELECT {ITEM_COLUMNS} FROM content_items ORDER BY {order}"))
      .await
  }

  // ── Principals ────────────────────────────────────────────────────────────

  async fn find_or_create_principal(&self, identifier: &str) -> Result<Principal> {
    let identifier = identifier.to_owned();
    let lookup = identifier.clone();

    let (principal, created): (Option<Principal>, bool) = self
      .conn
      .call(move |conn| {
        let created = conn.execute(
          "INSERT INTO principals (identifier) VALUES (?1)
           ON CONFLICT(identifier) DO NOTHING",
          rusqlite::params![lookup],
        )? > 0;
        let principal = conn
          .query_row(
            "SELECT id, identifier FROM principals WHERE identifier = ?1",
            rusqlite::params![lookup],
            principal_from_row,
          )
          .optional()?;
        Ok((principal, created))
      })
      .await?;

    let principal = principal.ok_or(Error::PrincipalMissing(identifier))?;
    if created {
      tracing::info!(id = principal.id, identifier = %principal.identifier, "principal created");
    }
    Ok(principal)
  }

  async fn get_principal(&self, id: i64) -> Result<Option<Principal>> {
    let principal = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, identifier FROM principals WHERE id = ?1",
            rusqlite::params![id],
            principal_from_row,
          )
          .optional()?)
      })
      .await?;
    Ok(principal)
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(
    &self,
    principal_id:  Option<i64>,
    request_token: Option<RequestToken>,
    ttl:           Duration,
  ) -> Result<Session> {
    // Stored with microsecond precision; the returned value must match a re-read.
    let now = Utc::now().trunc_subsecs(6);
    let session = Session {
      session_id: Uuid::new_v4(),
      principal_id,
      request_token,
      created_at: now,
      expires_at: now + ttl,
    };

    let id_str      = encode_uuid(session.session_id);
    let token       = session.request_token.as_ref().map(|t| t.token.clone());
    let secret      = session.request_token.as_ref().map(|t| t.token_secret.clone());
    let created_str = encode_dt(session.created_at);
    let expires_str = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (
             session_id, principal_id, request_token, request_token_secret,
             created_at, expires_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, principal_id, token, secret, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
            rusqlite::params![id_str],
            RawSession::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn delete_session(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE session_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn purge_expired_sessions(&self) -> Result<usize> {
    let now_str = encode_dt(Utc::now());
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;
    Ok(removed)
  }
}
