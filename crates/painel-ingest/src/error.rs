//! Error types for `painel-ingest`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to read {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{origin}: {source}")]
  Csv {
    origin: String,
    #[source]
    source: csv::Error,
  },

  #[error("{0}: bytes are not valid UTF-8")]
  Encoding(String),

  #[error("separator {0:?} is not a single ASCII character")]
  Separator(char),

  /// Every missing column is listed, together with what the file has.
  #[error("{origin}: missing required columns {missing:?}; columns found: {found:?}")]
  MissingColumns {
    origin:  String,
    missing: Vec<String>,
    found:   Vec<String>,
  },

  #[error("{origin}: value {value:?} in column {column:?} is not a number")]
  InvalidNumber {
    origin: String,
    column: String,
    value:  String,
  },

  #[error("malformed file name {file:?}: {problem}")]
  MalformedFilename {
    file:    String,
    problem: FilenameProblem,
  },
}

/// Why a file name did not yield a code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameProblem {
  #[error("expected prefix {0:?}")]
  WrongPrefix(String),

  #[error("expected suffix {0:?}")]
  WrongSuffix(String),

  #[error("expected a {expected}-character code, found {found:?}")]
  WrongCodeLength { expected: usize, found: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
