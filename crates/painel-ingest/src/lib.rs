//! Tabular input for the painel loaders.
//!
//! Pipeline:
//!   file bytes
//!     └─ decode (UTF-8 / windows-1252)        → text
//!          └─ parse_table(dialect)             → WideTable
//!               └─ WideToLong::reshape()        → Vec<CandidateRow>
//!
//! Nothing in here touches the database; names come out un-resolved.

pub mod coerce;
pub mod dialect;
pub mod error;
pub mod filename;
pub mod reshape;
pub mod table;

pub use coerce::{Coercion, CoercionPolicy};
pub use dialect::{Dialect, TextEncoding};
pub use error::{Error, Result};
pub use filename::FilenameCode;
pub use reshape::{ColumnMapping, Shaped, WideToLong, ZeroPolicy};
pub use table::{Record, WideTable, parse_table, read_table};
