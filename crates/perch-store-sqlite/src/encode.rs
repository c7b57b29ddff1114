//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix), so lexical order in SQL equals chronological
//! order. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use perch_core::{
  item::ContentItem, principal::Principal, provider::RequestToken, session::Session,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw rows ─────────────────────────────────────────────────────────────────

/// A `content_items` row as read from SQLite.
pub struct RawItem {
  pub id:         i64,
  pub body:       String,
  pub created_at: String,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawItem {
      id:         row.get(0)?,
      body:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_item(self) -> Result<ContentItem> {
    Ok(ContentItem {
      id:         self.id,
      body:       self.body,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub fn principal_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Principal> {
  Ok(Principal { id: row.get(0)?, identifier: row.get(1)? })
}

/// A `sessions` row as read from SQLite.
pub struct RawSession {
  pub session_id:           String,
  pub principal_id:         Option<i64>,
  pub request_token:        Option<String>,
  pub request_token_secret: Option<String>,
  pub created_at:           String,
  pub expires_at:           String,
}

impl RawSession {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSession {
      session_id:           row.get(0)?,
      principal_id:         row.get(1)?,
      request_token:        row.get(2)?,
      request_token_secret: row.get(3)?,
      created_at:           row.get(4)?,
      expires_at:           row.get(5)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    let request_token = match (self.request_token, self.request_token_secret) {
      (Some(token), Some(token_secret)) => Some(RequestToken { token, token_secret }),
      _ => None,
    };
    Ok(Session {
      session_id: decode_uuid(&self.session_id)?,
      principal_id: self.principal_id,
      request_token,
      created_at: decode_dt(&self.created_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}
