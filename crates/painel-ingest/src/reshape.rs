//! Wide-to-long reshaping.
//!
//! A wide file has one column per category (`qtd_tomografo`, `qtd_pet_ct`,
//! ...). The reshaper turns every (record, mapped column) pair into one
//! [`CandidateRow`] whose last name is the column's category label.

use painel_core::{
  CanonicalName,
  fact::{CandidateRow, Cell},
  normalize,
  period::Period,
};

use crate::{
  Result,
  coerce::CoercionPolicy,
  table::{Record, WideTable},
};

/// One wide column and the category label it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
  pub source: String,
  pub label:  String,
}

/// Whether a zero quantity is a fact worth recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPolicy {
  /// Absence is not recorded: quantities `<= 0` produce no row.
  SkipNonPositive,
  /// Every pair produces a row, zero included.
  KeepZero,
}

/// Explicit wide-to-long mapping for one dataset.
#[derive(Debug, Clone)]
pub struct WideToLong {
  pub columns:  Vec<ColumnMapping>,
  pub zeros:    ZeroPolicy,
  pub coercion: CoercionPolicy,
}

/// Output of [`WideToLong::reshape`].
#[derive(Debug, Clone, Default)]
pub struct Shaped {
  pub rows:          Vec<CandidateRow>,
  /// Records dropped because their names or period could not be derived.
  pub dropped_rows:  usize,
  /// Pairs skipped by the zero or coercion policy.
  pub skipped_cells: usize,
}

impl WideToLong {
  pub fn new(pairs: &[(&str, &str)], zeros: ZeroPolicy, coercion: CoercionPolicy) -> Self {
    let columns = pairs
      .iter()
      .map(|(source, label)| ColumnMapping {
        source: (*source).to_owned(),
        label:  (*label).to_owned(),
      })
      .collect();
    Self { columns, zeros, coercion }
  }

  /// Map every header not in `excluded` (compared by folded key) to itself.
  /// Blank headers are ignored.
  pub fn from_headers_except(
    headers: &[String],
    excluded: &[&str],
    zeros: ZeroPolicy,
    coercion: CoercionPolicy,
  ) -> Self {
    let excluded: Vec<String> = excluded.iter().filter_map(|e| normalize(Some(*e))).collect();
    let columns = headers
      .iter()
      .filter(|h| normalize(Some(h.as_str())).is_some_and(|k| !excluded.contains(&k)))
      .map(|h| ColumnMapping { source: h.clone(), label: h.trim().to_owned() })
      .collect();
    Self { columns, zeros, coercion }
  }

  pub fn source_columns(&self) -> Vec<&str> {
    self.columns.iter().map(|c| c.source.as_str()).collect()
  }

  /// Reshape `table`.
  ///
  /// `row_context` derives the names and period shared by every long row of
  /// a record; returning `None` drops the record. The category label is
  /// appended as the last name of each produced row.
  pub fn reshape<F>(&self, table: &WideTable, mut row_context: F) -> Result<Shaped>
  where
    F: FnMut(&Record<'_>) -> Option<(Vec<CanonicalName>, Period)>,
  {
    table.require(self.source_columns().as_slice())?;

    let labels: Vec<Option<CanonicalName>> = self
      .columns
      .iter()
      .map(|c| CanonicalName::new(&c.label))
      .collect();

    let mut shaped = Shaped::default();

    for record in table.records() {
      let Some((names, period)) = row_context(&record) else {
        shaped.dropped_rows += 1;
        continue;
      };

      for (mapping, label) in self.columns.iter().zip(&labels) {
        let Some(label) = label else {
          shaped.skipped_cells += 1;
          continue;
        };
        let quantity = match record.count(&mapping.source, self.coercion)? {
          Some(q) => q,
          None => {
            shaped.skipped_cells += 1;
            continue;
          }
        };
        if self.zeros == ZeroPolicy::SkipNonPositive && quantity <= 0 {
          shaped.skipped_cells += 1;
          continue;
        }

        let mut row_names = names.clone();
        row_names.push(label.clone());
        shaped.rows.push(CandidateRow {
          names:    row_names,
          period,
          measures: vec![Cell::Int(quantity)],
        });
      }
    }

    tracing::debug!(
      origin = table.origin(),
      rows = shaped.rows.len(),
      dropped = shaped.dropped_rows,
      skipped = shaped.skipped_cells,
      "reshaped wide table"
    );
    Ok(shaped)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Dialect, Error, parse_table};

  const EQUIP: &[(&str, &str)] = &[
    ("qtd_tomografo", "Tomógrafo Computadorizado"),
    ("qtd_pet_ct", "PET/CT"),
  ];

  fn by_ra(record: &Record<'_>) -> Option<(Vec<CanonicalName>, Period)> {
    let ra = CanonicalName::titled(record.get("ra")?)?;
    Some((vec![ra], Period::year(2025)))
  }

  #[test]
  fn non_positive_quantities_are_skipped() {
    let table = parse_table(
      "ra,qtd_tomografo,qtd_pet_ct\nceilândia,2,0\n",
      "t",
      &Dialect::default(),
    )
    .unwrap();
    let plan = WideToLong::new(EQUIP, ZeroPolicy::SkipNonPositive, CoercionPolicy::DropRowOnError);
    let shaped = plan.reshape(&table, by_ra).unwrap();

    assert_eq!(shaped.rows.len(), 1);
    let row = &shaped.rows[0];
    assert_eq!(row.names[0].display(), "Ceilândia");
    assert_eq!(row.names[1].display(), "Tomógrafo Computadorizado");
    assert_eq!(row.period, Period::year(2025));
    assert_eq!(row.measures, vec![Cell::Int(2)]);
    assert_eq!(shaped.skipped_cells, 1);
  }

  #[test]
  fn keep_zero_emits_every_pair() {
    let table =
      parse_table("ra,qtd_tomografo,qtd_pet_ct\nGuará,-5,x\n", "t", &Dialect::default()).unwrap();
    let plan = WideToLong::new(EQUIP, ZeroPolicy::KeepZero, CoercionPolicy::ZeroOnError);
    let shaped = plan.reshape(&table, by_ra).unwrap();

    assert_eq!(shaped.rows.len(), 2);
    assert!(shaped.rows.iter().all(|r| r.measures == vec![Cell::Int(0)]));
  }

  #[test]
  fn records_without_context_are_dropped() {
    let table =
      parse_table("ra,qtd_tomografo,qtd_pet_ct\n ,1,1\nGama,1,1\n", "t", &Dialect::default())
        .unwrap();
    let plan = WideToLong::new(EQUIP, ZeroPolicy::SkipNonPositive, CoercionPolicy::ZeroOnError);
    let shaped = plan.reshape(&table, by_ra).unwrap();
    assert_eq!(shaped.dropped_rows, 1);
    assert_eq!(shaped.rows.len(), 2);
  }

  #[test]
  fn unmapped_source_column_fails_fast() {
    let table = parse_table("ra,qtd_tomografo\nGama,1\n", "t", &Dialect::default()).unwrap();
    let plan = WideToLong::new(EQUIP, ZeroPolicy::SkipNonPositive, CoercionPolicy::ZeroOnError);
    let err = plan.reshape(&table, by_ra).unwrap_err();
    assert!(matches!(err, Error::MissingColumns { ref missing, .. } if missing == &["qtd_pet_ct"]));
  }

  #[test]
  fn mapping_from_headers_skips_excluded() {
    let headers: Vec<String> = ["Data", "Técnico em Radiologia", " ", "TOTAL"]
      .iter()
      .map(|s| s.to_string())
      .collect();
    let plan = WideToLong::from_headers_except(
      &headers,
      &["data", "Total"],
      ZeroPolicy::KeepZero,
      CoercionPolicy::DropRowOnError,
    );
    assert_eq!(plan.source_columns(), vec!["Técnico em Radiologia"]);
  }
}
