//! Error types for `painel-core`.

use thiserror::Error;

use crate::period::Period;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}: conflict target is empty")]
  EmptyConflictTarget(&'static str),

  #[error("{table}: conflict column {column:?} is not a column of the table")]
  UnknownConflictColumn { table: &'static str, column: String },

  #[error("{table}: expected {expected} {part}, found {found}")]
  Arity {
    table:    &'static str,
    part:     &'static str,
    expected: usize,
    found:    usize,
  },

  #[error("{table}: period {period:?} does not match the table's period columns")]
  PeriodShape { table: &'static str, period: Period },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
