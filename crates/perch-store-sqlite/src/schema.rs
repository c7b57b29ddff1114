//! SQL schema for the perch SQLite store.
//!
//! [`SCHEMA`] runs on every open and is idempotent. [`RESET`] is only run on
//! explicit request and destroys all data.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS principals (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    identifier  TEXT NOT NULL UNIQUE
);

-- One row per ingested timeline item. `id` is the provider's item id.
-- Rows are written once and never updated.
CREATE TABLE IF NOT EXISTS content_items (
    id          INTEGER PRIMARY KEY,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL   -- fixed-width RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id           TEXT PRIMARY KEY,
    principal_id         INTEGER REFERENCES principals(id) ON DELETE CASCADE,
    request_token        TEXT,
    request_token_secret TEXT,
    created_at           TEXT NOT NULL,
    expires_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS content_items_body_idx    ON content_items(body);
CREATE INDEX IF NOT EXISTS content_items_created_idx ON content_items(created_at);
CREATE INDEX IF NOT EXISTS sessions_expires_idx      ON sessions(expires_at);

PRAGMA user_version = 1;
";

/// Drops every table owned by the store. Followed by [`SCHEMA`].
pub const RESET: &str = "
DROP TABLE IF EXISTS sessions;
DROP TABLE IF EXISTS content_items;
DROP TABLE IF EXISTS principals;
";
