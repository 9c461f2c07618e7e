//! Loads the painel public-health extracts into the relational store.
//!
//! Every dataset reads its files through [`painel_ingest`], resolves names
//! against the dimension tables and writes facts through a
//! [`LoadStore`](painel_core::store::LoadStore). A failing file is recorded
//! in the [`RunSummary`](summary::RunSummary) and the run moves on.

pub mod config;
pub mod datasets;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod summary;
pub mod tables;

pub use config::EtlConfig;
pub use datasets::Dataset;
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
