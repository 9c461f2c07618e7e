//! Run summaries.

use std::{cmp::Ordering, collections::BTreeSet, fmt, path::Path};

use chrono::{DateTime, Utc};
use painel_core::{dimension::SpellingConflict, normalize};
use serde::Serialize;
use uuid::Uuid;

/// A name that matched no row of a closed dimension.
///
/// Compared by dimension and folded key, so the first spelling recorded is
/// the one reported.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedName {
  pub dimension: String,
  pub name:      String,
  #[serde(skip)]
  key:           String,
}

impl UnresolvedName {
  pub fn new(dimension: impl Into<String>, name: impl Into<String>) -> Self {
    let name = name.into();
    let key = normalize(Some(&name)).unwrap_or_else(|| name.clone());
    Self { dimension: dimension.into(), name, key }
  }
}

impl PartialEq for UnresolvedName {
  fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for UnresolvedName {}

impl PartialOrd for UnresolvedName {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for UnresolvedName {
  fn cmp(&self, other: &Self) -> Ordering {
    (&self.dimension, &self.key).cmp(&(&other.dimension, &other.key))
  }
}

/// A spelling disagreement, tagged with the dimension it was seen in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct NameConflict {
  pub dimension: String,
  #[serde(flatten)]
  pub conflict:  SpellingConflict,
}

/// An input that failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
  pub file:  String,
  pub error: String,
}

/// Counters and diagnostics for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
  pub dataset:           String,
  pub rows_read:         usize,
  pub rows_shaped:       usize,
  pub rows_resolved:     usize,
  pub rows_written:      usize,
  pub dimension_inserts: usize,
  pub unresolved:        BTreeSet<UnresolvedName>,
  pub conflicts:         BTreeSet<NameConflict>,
  pub file_errors:       Vec<FileError>,
}

impl DatasetSummary {
  pub fn new(dataset: impl Into<String>) -> Self {
    Self { dataset: dataset.into(), ..Self::default() }
  }

  /// A summary for a dataset that failed before reading any input.
  pub fn from_error(dataset: impl Into<String>, file: &Path, error: impl fmt::Display) -> Self {
    let mut summary = Self::new(dataset);
    summary.record_error(file, error);
    summary
  }

  pub fn failed(&self) -> bool { !self.file_errors.is_empty() }

  /// Add the counters and diagnostics of `other`, keeping this dataset name.
  pub fn merge(&mut self, other: DatasetSummary) {
    self.rows_read += other.rows_read;
    self.rows_shaped += other.rows_shaped;
    self.rows_resolved += other.rows_resolved;
    self.rows_written += other.rows_written;
    self.dimension_inserts += other.dimension_inserts;
    self.unresolved.extend(other.unresolved);
    self.conflicts.extend(other.conflicts);
    self.file_errors.extend(other.file_errors);
  }

  pub fn record_unresolved<I>(&mut self, dimension: &str, names: I)
  where
    I: IntoIterator<Item = String>,
  {
    self
      .unresolved
      .extend(names.into_iter().map(|name| UnresolvedName::new(dimension, name)));
  }

  pub fn record_conflicts<I>(&mut self, dimension: &str, conflicts: I)
  where
    I: IntoIterator<Item = SpellingConflict>,
  {
    self.conflicts.extend(conflicts.into_iter().map(|conflict| NameConflict {
      dimension: dimension.to_owned(),
      conflict,
    }));
  }

  pub fn record_error(&mut self, file: &Path, error: impl fmt::Display) {
    self.file_errors.push(FileError {
      file:  file.display().to_string(),
      error: error.to_string(),
    });
  }
}

/// Everything one invocation did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  pub run_id:     Uuid,
  pub started_at: DateTime<Utc>,
  pub datasets:   Vec<DatasetSummary>,
}

impl RunSummary {
  pub fn new() -> Self {
    Self { run_id: Uuid::new_v4(), started_at: Utc::now(), datasets: Vec::new() }
  }

  pub fn failed(&self) -> bool { self.datasets.iter().any(DatasetSummary::failed) }
}

impl Default for RunSummary {
  fn default() -> Self { Self::new() }
}

// ─── Text report ─────────────────────────────────────────────────────────────

impl fmt::Display for RunSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "run {} started {}", self.run_id, self.started_at.to_rfc3339())?;
    writeln!(
      f,
      "{:<20} {:>8} {:>8} {:>8} {:>8} {:>8}",
      "dataset", "read", "shaped", "resolved", "written", "new dims"
    )?;
    for d in &self.datasets {
      writeln!(
        f,
        "{:<20} {:>8} {:>8} {:>8} {:>8} {:>8}",
        d.dataset, d.rows_read, d.rows_shaped, d.rows_resolved, d.rows_written, d.dimension_inserts
      )?;
    }

    for d in &self.datasets {
      for u in &d.unresolved {
        writeln!(f, "{}: unresolved {} {:?}", d.dataset, u.dimension, u.name)?;
      }
      for c in &d.conflicts {
        writeln!(
          f,
          "{}: {} spelling {:?} differs from stored {:?}",
          d.dataset, c.dimension, c.conflict.observed, c.conflict.canonical
        )?;
      }
      for e in &d.file_errors {
        writeln!(f, "{}: FAILED {}: {}", d.dataset, e.file, e.error)?;
      }
    }
    Ok(())
  }
}
