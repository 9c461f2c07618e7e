//! SQLite backend for the painel loaders.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every [`LoadStore`] call is a single
//! transaction.
//!
//! [`LoadStore`]: painel_core::store::LoadStore

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
