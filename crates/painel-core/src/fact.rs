//! Fact tables: measured quantities keyed by dimension references plus a
//! period.
//!
//! Whether a fact table deduplicates on its natural key or strictly appends
//! is declared per table through [`WriteMode`]; the two are never unified.

use chrono::NaiveDate;

use crate::{
  dimension::DimensionKey,
  error::{Error, Result},
  normalize::CanonicalName,
  period::Period,
};

// ─── Values ──────────────────────────────────────────────────────────────────

/// A single column value in a fact or dimension row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Null,
  Int(i64),
  Real(f64),
  Text(String),
  Date(NaiveDate),
}

impl From<i64> for Cell {
  fn from(v: i64) -> Self { Cell::Int(v) }
}

impl From<String> for Cell {
  fn from(v: String) -> Self { Cell::Text(v) }
}

impl From<Option<f64>> for Cell {
  fn from(v: Option<f64>) -> Self { v.map_or(Cell::Null, Cell::Real) }
}

impl From<Option<String>> for Cell {
  fn from(v: Option<String>) -> Self { v.map_or(Cell::Null, Cell::Text) }
}

// ─── Table description ───────────────────────────────────────────────────────

/// How a batch is written to a fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
  /// Every row is inserted; re-running a load duplicates rows.
  Append,
  /// Insert, or on conflict on exactly `conflict` overwrite every other
  /// column with the incoming values.
  Upsert { conflict: &'static [&'static str] },
}

/// Period columns of a fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodColumns {
  Year { year: &'static str },
  YearMonth { year: &'static str, month: &'static str },
  Date { date: &'static str },
}

impl PeriodColumns {
  pub fn columns(self) -> Vec<&'static str> {
    match self {
      PeriodColumns::Year { year } => vec![year],
      PeriodColumns::YearMonth { year, month } => vec![year, month],
      PeriodColumns::Date { date } => vec![date],
    }
  }

  pub fn accepts(self, period: &Period) -> bool {
    matches!(
      (self, period),
      (PeriodColumns::Year { .. }, Period::Year { .. })
        | (PeriodColumns::YearMonth { .. }, Period::YearMonth { .. })
        | (PeriodColumns::Date { .. }, Period::Date { .. })
    )
  }
}

/// Column values of a period, in [`PeriodColumns::columns`] order.
pub fn period_cells(period: &Period) -> Vec<Cell> {
  match *period {
    Period::Year { year } => vec![Cell::Int(year.into())],
    Period::YearMonth { year, month } => vec![Cell::Int(year.into()), Cell::Int(month.into())],
    Period::Date { date } => vec![Cell::Date(date)],
  }
}

/// Static description of a fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactTable {
  pub table:           &'static str,
  /// Foreign-key columns, in the order [`FactRow::keys`] supplies them.
  pub key_columns:     &'static [&'static str],
  pub period:          PeriodColumns,
  pub measure_columns: &'static [&'static str],
  pub mode:            WriteMode,
}

impl FactTable {
  /// All columns written by an insert: keys, period, measures.
  pub fn columns(&self) -> Vec<&'static str> {
    let mut cols = self.key_columns.to_vec();
    cols.extend(self.period.columns());
    cols.extend_from_slice(self.measure_columns);
    cols
  }

  /// Reject conflict targets that are not columns of the table.
  pub fn validate(&self) -> Result<()> {
    if let WriteMode::Upsert { conflict } = self.mode {
      let columns = self.columns();
      if conflict.is_empty() {
        return Err(Error::EmptyConflictTarget(self.table));
      }
      if let Some(missing) = conflict.iter().find(|c| !columns.contains(*c)) {
        return Err(Error::UnknownConflictColumn {
          table:  self.table,
          column: (*missing).to_owned(),
        });
      }
    }
    Ok(())
  }

  /// Check that a row has the shape this table expects.
  pub fn check_row(&self, row: &FactRow) -> Result<()> {
    if row.keys.len() != self.key_columns.len() {
      return Err(Error::Arity {
        table:    self.table,
        part:     "keys",
        expected: self.key_columns.len(),
        found:    row.keys.len(),
      });
    }
    if row.measures.len() != self.measure_columns.len() {
      return Err(Error::Arity {
        table:    self.table,
        part:     "measures",
        expected: self.measure_columns.len(),
        found:    row.measures.len(),
      });
    }
    if !self.period.accepts(&row.period) {
      return Err(Error::PeriodShape { table: self.table, period: row.period });
    }
    Ok(())
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A fully resolved fact row, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
  pub keys:     Vec<DimensionKey>,
  pub period:   Period,
  pub measures: Vec<Cell>,
}

impl FactRow {
  /// Values in [`FactTable::columns`] order.
  pub fn cells(&self) -> Vec<Cell> {
    let mut cells: Vec<Cell> = self.keys.iter().copied().map(Cell::Int).collect();
    cells.extend(period_cells(&self.period));
    cells.extend(self.measures.iter().cloned());
    cells
  }
}

/// A shaped row whose dimension references are still names.
///
/// `names[i]` is resolved against the i-th dimension of the load that
/// consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
  pub names:    Vec<CanonicalName>,
  pub period:   Period,
  pub measures: Vec<Cell>,
}
