//! Dimensions: reference tables mapping a canonical name to a surrogate key.
//!
//! A dimension row is created lazily the first time its name is resolved in
//! [`DimensionMode::Open`], or pre-seeded for [`DimensionMode::Closed`]
//! dimensions. Rows are never deleted by the loaders.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::{fact::Cell, normalize::CanonicalName};

/// Surrogate key assigned by the database.
pub type DimensionKey = i64;

/// Whether unknown names may be inserted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionMode {
  /// Unknown names are inserted and receive a fresh key.
  Open,
  /// Unknown names are reported and never inserted.
  Closed,
}

/// Static description of a dimension table.
///
/// Every dimension table has an integer primary key, a display column, a
/// `UNIQUE` folded-key column and zero or more descriptive columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
  pub table:         &'static str,
  pub id_column:     &'static str,
  /// Column holding the display form the name was first written with.
  pub name_column:   &'static str,
  /// Column holding the folded lookup key.
  pub key_column:    &'static str,
  pub extra_columns: &'static [&'static str],
}

/// A name to resolve, with values for the dimension's descriptive columns.
#[derive(Debug, Clone)]
pub struct Member {
  pub name:   CanonicalName,
  /// One value per [`Dimension::extra_columns`] entry, in order.
  pub extras: Vec<Cell>,
}

impl Member {
  pub fn new(name: CanonicalName) -> Self { Self { name, extras: Vec::new() } }

  pub fn with_extras(name: CanonicalName, extras: Vec<Cell>) -> Self {
    Self { name, extras }
  }
}

/// Two spellings of one folded key disagreed; the first one seen won.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SpellingConflict {
  pub key:       String,
  pub canonical: String,
  pub observed:  String,
}

/// Outcome of resolving a set of names against one dimension.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
  /// Folded key → surrogate key, for every resolved name.
  pub keys:       HashMap<String, DimensionKey>,
  /// Display form of every distinct name that could not be resolved.
  pub unresolved: BTreeSet<String>,
  /// Number of rows inserted by this call.
  pub inserted:   usize,
  pub conflicts:  Vec<SpellingConflict>,
}

impl Resolution {
  pub fn get(&self, name: &CanonicalName) -> Option<DimensionKey> {
    self.keys.get(name.key()).copied()
  }

  /// Fold another resolution of the same dimension into this one.
  pub fn merge(&mut self, other: Resolution) {
    self.keys.extend(other.keys);
    self.unresolved.extend(other.unresolved);
    self.inserted += other.inserted;
    self.conflicts.extend(other.conflicts);
  }
}

/// Counts returned by an insert-or-update of descriptive columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshCount {
  pub inserted:  usize,
  pub updated:   usize,
  /// Spellings that disagreed with the batch or with the stored display.
  pub conflicts: Vec<SpellingConflict>,
}

/// Deduplicate members by folded key, first spelling wins.
///
/// Later spellings that differ from the first one are returned as conflicts.
pub fn dedup_members(members: Vec<Member>) -> (Vec<Member>, Vec<SpellingConflict>) {
  let mut seen: HashMap<String, usize> = HashMap::new();
  let mut unique: Vec<Member> = Vec::new();
  let mut conflicts = Vec::new();

  for member in members {
    match seen.get(member.name.key()) {
      Some(&idx) => {
        let first = &unique[idx].name;
        if first.display() != member.name.display() {
          conflicts.push(SpellingConflict {
            key:       member.name.key().to_owned(),
            canonical: first.display().to_owned(),
            observed:  member.name.display().to_owned(),
          });
        }
      }
      None => {
        seen.insert(member.name.key().to_owned(), unique.len());
        unique.push(member);
      }
    }
  }

  (unique, conflicts)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn member(raw: &str) -> Member { Member::new(CanonicalName::new(raw).unwrap()) }

  #[test]
  fn dedup_keeps_first_spelling() {
    let (unique, conflicts) =
      dedup_members(vec![member("Ceilândia"), member("CEILÂNDIA"), member("Guará")]);
    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].name.display(), "Ceilândia");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].canonical, "Ceilândia");
    assert_eq!(conflicts[0].observed, "CEILÂNDIA");
  }

  #[test]
  fn identical_repeats_are_not_conflicts() {
    let (unique, conflicts) = dedup_members(vec![member("Guará"), member(" Guará ")]);
    assert_eq!(unique.len(), 1);
    assert!(conflicts.is_empty());
  }
}
