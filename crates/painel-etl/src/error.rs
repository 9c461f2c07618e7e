//! Error type for `painel-etl`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Ingest(#[from] painel_ingest::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A fixed reference the dataset cannot do without is absent.
  #[error("{dimension}: required reference {name:?} not found")]
  MissingReference { dimension: &'static str, name: String },

  /// A candidate row carried a different number of names than the load has
  /// dimensions.
  #[error("{table}: expected {expected} dimension names per row, found {found}")]
  CandidateArity {
    table:    &'static str,
    expected: usize,
    found:    usize,
  },

  #[error("invalid file pattern: {0}")]
  Pattern(#[from] glob::PatternError),

  #[error("cannot list files: {0}")]
  Glob(#[from] glob::GlobError),

  #[error("no file matches {0}")]
  NoFiles(String),

  #[error("unknown dataset {0:?}")]
  UnknownDataset(String),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
}

impl Error {
  /// Box a backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
