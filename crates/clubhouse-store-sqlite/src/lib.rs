//! SQLite backend for the Clubhouse store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each [`ClubStore`] write runs a
//! service from `clubhouse_core::service` inside one `BEGIN IMMEDIATE`
//! transaction on that thread.
//!
//! [`ClubStore`]: clubhouse_core::store::ClubStore

mod encode;
mod repo;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
