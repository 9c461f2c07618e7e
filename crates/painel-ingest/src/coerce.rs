//! Numeric coercion of measure cells.
//!
//! Source extracts carry blanks, dashes, footnote markers and the odd
//! negative count. What happens to such a cell is chosen per field through
//! [`CoercionPolicy`], never by an implicit default.

use serde::Deserialize;

/// What to do with a cell that does not parse as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionPolicy {
  /// Abort the file with [`Error::InvalidNumber`](crate::Error::InvalidNumber).
  Fail,
  /// Treat the cell as zero.
  ZeroOnError,
  /// Drop the row the cell belongs to.
  DropRowOnError,
}

/// Result of applying a [`CoercionPolicy`] to one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
  Value(i64),
  DropRow,
  Invalid,
}

impl CoercionPolicy {
  pub fn apply(self, raw: &str) -> Coercion {
    match (parse_count(raw), self) {
      (Some(n), _) => Coercion::Value(n),
      (None, CoercionPolicy::ZeroOnError) => Coercion::Value(0),
      (None, CoercionPolicy::DropRowOnError) => Coercion::DropRow,
      (None, CoercionPolicy::Fail) => Coercion::Invalid,
    }
  }
}

/// Parse a count. Decimals are truncated, negatives floored at zero.
///
/// A lone `,` is read as the decimal separator.
pub fn parse_count(raw: &str) -> Option<i64> {
  let s = raw.trim();
  if s.is_empty() {
    return None;
  }
  let n = match s.parse::<i64>() {
    Ok(n) => n,
    Err(_) => {
      let f = parse_real(s)?;
      f.trunc() as i64
    }
  };
  Some(n.max(0))
}

/// Parse an optional real measure (scores). Blank or garbage is `None`.
pub fn parse_score(raw: &str) -> Option<f64> { parse_real(raw.trim()) }

fn parse_real(s: &str) -> Option<f64> {
  let f = if s.contains(',') && !s.contains('.') {
    s.replace(',', ".").parse::<f64>().ok()?
  } else {
    s.parse::<f64>().ok()?
  };
  f.is_finite().then_some(f)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negatives_are_floored_at_zero() {
    assert_eq!(parse_count("-5"), Some(0));
    assert_eq!(parse_count("-0.5"), Some(0));
    assert_eq!(CoercionPolicy::Fail.apply("-5"), Coercion::Value(0));
  }

  #[test]
  fn decimals_are_truncated() {
    assert_eq!(parse_count("3.9"), Some(3));
    assert_eq!(parse_count("12,0"), Some(12));
    assert_eq!(parse_count(" 7 "), Some(7));
  }

  #[test]
  fn garbage_follows_policy() {
    for raw in ["", "-", "n/d", "NaN", "inf"] {
      assert_eq!(CoercionPolicy::ZeroOnError.apply(raw), Coercion::Value(0), "{raw:?}");
      assert_eq!(CoercionPolicy::DropRowOnError.apply(raw), Coercion::DropRow, "{raw:?}");
      assert_eq!(CoercionPolicy::Fail.apply(raw), Coercion::Invalid, "{raw:?}");
    }
  }

  #[test]
  fn scores_keep_sign_and_fraction() {
    assert_eq!(parse_score("7.5"), Some(7.5));
    assert_eq!(parse_score("8,25"), Some(8.25));
    assert_eq!(parse_score(""), None);
    assert_eq!(parse_score("abc"), None);
  }
}
