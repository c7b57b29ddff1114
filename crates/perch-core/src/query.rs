//! Sort parameters for [`TimelineStore::sorted_items`](crate::store::TimelineStore::sorted_items).
//!
//! Column names arrive as untrusted query-string text; only the variants
//! below ever reach SQL.

use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// A sortable `content_items` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, Display)]
pub enum SortColumn {
  #[strum(serialize = "id")]
  Id,
  /// `tweet` is accepted as an alias.
  #[strum(serialize = "body", serialize = "tweet")]
  Body,
  #[strum(serialize = "created_at", serialize = "created_date")]
  CreatedAt,
}

impl SortColumn {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownSortColumn(s.to_owned()))
  }

  /// The SQL column name.
  pub fn column(self) -> &'static str {
    match self {
      SortColumn::Id => "id",
      SortColumn::Body => "body",
      SortColumn::CreatedAt => "created_at",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
  Asc,
  Desc,
}

impl SortDirection {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownSortDirection(s.to_owned()))
  }

  pub fn keyword(self) -> &'static str {
    match self {
      SortDirection::Asc => "ASC",
      SortDirection::Desc => "DESC",
    }
  }
}
