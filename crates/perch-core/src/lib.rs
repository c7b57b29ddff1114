//! Core types and trait definitions for perch.
//!
//! This crate is free of HTTP and database dependencies. The storage backend
//! (`perch-store-sqlite`), the social provider (`perch-twitter`) and the HTTP
//! layers all depend on it.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures instead.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod item;
pub mod principal;
pub mod provider;
pub mod query;
pub mod session;
pub mod store;

pub use error::{Error, Result};
