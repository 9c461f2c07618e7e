//! Error type for `painel-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] painel_core::Error),

  /// A `UNIQUE`, `CHECK`, `NOT NULL` or foreign-key constraint rejected the
  /// batch. Nothing from the batch was written.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A member carried a different number of descriptive values than the
  /// dimension has columns.
  #[error("{table}: expected {expected} descriptive values for {name:?}, found {found}")]
  MemberArity {
    table:    &'static str,
    name:     String,
    expected: usize,
    found:    usize,
  },
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, msg))
        if e.code == ErrorCode::ConstraintViolation =>
      {
        Error::ConstraintViolation(msg.unwrap_or_else(|| e.to_string()))
      }
      other => Error::Database(other),
    }
  }
}

impl Error {
  pub fn is_constraint_violation(&self) -> bool {
    matches!(self, Error::ConstraintViolation(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
