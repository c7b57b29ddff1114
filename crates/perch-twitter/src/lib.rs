//! Twitter adapter for perch.
//!
//! Signs requests with OAuth 1.0a, drives the first leg of the three-legged
//! handshake, and pages through the authenticated user's timeline. When the
//! API answers `429 Too Many Requests` the client sleeps until the window
//! resets and tries again instead of failing.

pub mod client;
pub mod config;
pub mod error;
pub mod oauth;
pub mod types;

pub use client::TwitterClient;
pub use config::{ClientSettings, RateLimitPolicy, TwitterCredentials};
pub use error::{TwitterError, TwitterResult};
