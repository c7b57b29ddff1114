//! Wire types for the v1.1 REST endpoints the adapter uses.

use chrono::{DateTime, Utc};
use perch_core::item::ContentItem;
use serde::Deserialize;

use crate::error::{TwitterError, TwitterResult};

/// `created_at` format used by the v1.1 API, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Subset of `GET account/verify_credentials.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
  pub id:          i64,
  pub screen_name: String,
}

/// Subset of a status object from `GET statuses/user_timeline.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
  pub id:         i64,
  pub text:       String,
  pub created_at: String,
}

impl Status {
  pub fn into_item(self) -> TwitterResult<ContentItem> {
    Ok(ContentItem {
      id:         self.id,
      created_at: parse_created_at(&self.created_at)?,
      body:       self.text,
    })
  }
}

pub fn parse_created_at(s: &str) -> TwitterResult<DateTime<Utc>> {
  DateTime::parse_from_str(s, CREATED_AT_FORMAT)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| TwitterError::InvalidTimestamp(s.to_owned()))
}

/// Error envelope of the v1.1 API: `{"errors":[{"code":..,"message":".."}]}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
  #[serde(default)]
  pub errors: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorMessage {
  #[serde(default)]
  pub code:    Option<i64>,
  pub message: String,
}
