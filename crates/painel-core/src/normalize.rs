//! Canonical forms for free-text labels.
//!
//! Every label that ends up as a join key (region names, equipment types,
//! professional categories, exam names) goes through [`normalize`]. Lookups
//! and equality only ever use the folded key; the display form is carried
//! alongside and never compared.

use std::{
  cmp::Ordering,
  fmt,
  hash::{Hash, Hasher},
};

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Fold a raw label into its lookup key.
///
/// Blank or missing input yields `None`. Otherwise the label is trimmed,
/// inner whitespace runs collapse to a single space, diacritics are removed
/// and the result is lower-cased.
pub fn normalize(raw: Option<&str>) -> Option<String> {
  let tidy = collapse_whitespace(raw?)?;
  Some(
    tidy
      .nfd()
      .filter(|c| !is_combining_mark(*c))
      .flat_map(char::to_lowercase)
      .collect(),
  )
}

/// Title-case a label: the first letter of every alphabetic run is
/// upper-cased, the remaining letters lower-cased.
pub fn title_case(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut in_word = false;
  for c in s.chars() {
    if c.is_alphabetic() {
      if in_word {
        out.extend(c.to_lowercase());
      } else {
        out.extend(c.to_uppercase());
      }
      in_word = true;
    } else {
      out.push(c);
      in_word = false;
    }
  }
  out
}

fn collapse_whitespace(s: &str) -> Option<String> {
  let joined = s.split_whitespace().collect::<Vec<_>>().join(" ");
  (!joined.is_empty()).then_some(joined)
}

// ─── CanonicalName ───────────────────────────────────────────────────────────

/// A label paired with its folded lookup key.
///
/// Equality, ordering and hashing consider only [`key`](Self::key), so two
/// spellings that fold together are the same name.
#[derive(Debug, Clone)]
pub struct CanonicalName {
  display: String,
  key:     String,
}

impl CanonicalName {
  /// Keep the original casing (trimmed, whitespace collapsed) as display.
  pub fn new(raw: &str) -> Option<Self> {
    let display = collapse_whitespace(raw)?;
    let key = normalize(Some(&display))?;
    Some(Self { display, key })
  }

  /// Like [`new`](Self::new) but the display form is title-cased.
  pub fn titled(raw: &str) -> Option<Self> {
    let display = title_case(&collapse_whitespace(raw)?);
    let key = normalize(Some(&display))?;
    Some(Self { display, key })
  }

  pub fn display(&self) -> &str { &self.display }

  pub fn key(&self) -> &str { &self.key }
}

impl PartialEq for CanonicalName {
  fn eq(&self, other: &Self) -> bool { self.key == other.key }
}

impl Eq for CanonicalName {}

impl Hash for CanonicalName {
  fn hash<H: Hasher>(&self, state: &mut H) { self.key.hash(state) }
}

impl PartialOrd for CanonicalName {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for CanonicalName {
  fn cmp(&self, other: &Self) -> Ordering { self.key.cmp(&other.key) }
}

impl fmt::Display for CanonicalName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.display)
  }
}
