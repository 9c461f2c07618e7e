//! Core types and trait definitions for the painel loaders.
//!
//! This crate is deliberately free of file-format and database dependencies.
//! The ingest, store and etl crates all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod dimension;
pub mod error;
pub mod fact;
pub mod normalize;
pub mod period;
pub mod store;

pub use error::{Error, Result};
pub use normalize::{CanonicalName, normalize};
