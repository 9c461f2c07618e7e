//! The `LoadStore` trait.
//!
//! Implemented by storage backends (e.g. `painel-store-sqlite`). The
//! orchestrator in `painel-etl` depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  dimension::{Dimension, DimensionMode, Member, RefreshCount, Resolution},
  fact::{FactRow, FactTable},
};

/// Abstraction over the relational store the loaders write into.
///
/// Every method is one transaction: it either applies completely or leaves
/// no trace.
pub trait LoadStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Dimensions ────────────────────────────────────────────────────────

  /// Map every member's folded name to its surrogate key.
  ///
  /// In [`DimensionMode::Open`] unknown names are inserted (display form
  /// and descriptive columns) in the same transaction as the lookup. In
  /// [`DimensionMode::Closed`] they are returned in
  /// [`Resolution::unresolved`] and nothing is written.
  fn resolve(
    &self,
    dimension: Dimension,
    members: Vec<Member>,
    mode: DimensionMode,
  ) -> impl Future<Output = Result<Resolution, Self::Error>> + Send + '_;

  /// Insert the members that are not present yet. Used to pre-seed closed
  /// dimensions.
  fn seed(
    &self,
    dimension: Dimension,
    members: Vec<Member>,
  ) -> impl Future<Output = Result<Resolution, Self::Error>> + Send + '_;

  /// Insert unknown members and overwrite the descriptive columns of known
  /// ones. The stored display name is never changed.
  fn refresh(
    &self,
    dimension: Dimension,
    members: Vec<Member>,
  ) -> impl Future<Output = Result<RefreshCount, Self::Error>> + Send + '_;

  // ── Facts ─────────────────────────────────────────────────────────────

  /// Write `rows` according to the table's [`WriteMode`](crate::fact::WriteMode)
  /// and return the number of rows applied. An empty batch is a no-op.
  fn upsert(
    &self,
    table: FactTable,
    rows: Vec<FactRow>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
