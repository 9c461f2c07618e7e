//! Reading a delimited file into a [`WideTable`].

use std::{fs, path::Path};

use crate::{
  Error, Result,
  coerce::{Coercion, CoercionPolicy},
  dialect::Dialect,
};

/// A parsed file: trimmed header names and the raw (trimmed) cell text of
/// every record.
#[derive(Debug, Clone)]
pub struct WideTable {
  origin:  String,
  headers: Vec<String>,
  rows:    Vec<Vec<String>>,
}

impl WideTable {
  /// Where the table came from, for diagnostics.
  pub fn origin(&self) -> &str { &self.origin }

  pub fn headers(&self) -> &[String] { &self.headers }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Index of the column named exactly `name` (header names are trimmed).
  pub fn column(&self, name: &str) -> Option<usize> {
    self.headers.iter().position(|h| h == name)
  }

  /// Fail with the full list of missing columns if any is absent.
  pub fn require<S: AsRef<str>>(&self, columns: &[S]) -> Result<()> {
    let missing: Vec<String> = columns
      .iter()
      .map(|c| c.as_ref())
      .filter(|c| self.column(c).is_none())
      .map(str::to_owned)
      .collect();

    if missing.is_empty() {
      Ok(())
    } else {
      Err(Error::MissingColumns {
        origin: self.origin.clone(),
        missing,
        found: self.headers.clone(),
      })
    }
  }

  pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
    self.rows.iter().map(move |cells| Record { table: self, cells })
  }
}

/// One record of a [`WideTable`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
  table: &'a WideTable,
  cells: &'a [String],
}

impl<'a> Record<'a> {
  /// Cell text by column name; `None` if the column does not exist. Short
  /// records read as empty cells.
  pub fn get(&self, column: &str) -> Option<&'a str> {
    self.table.column(column).map(|idx| self.field(idx))
  }

  pub fn field(&self, idx: usize) -> &'a str {
    self.cells.get(idx).map_or("", String::as_str)
  }

  /// Coerce a count column under `policy`.
  ///
  /// `Ok(None)` means the row must be dropped. A column the table does not
  /// have is an error whatever the policy.
  pub fn count(&self, column: &str, policy: CoercionPolicy) -> Result<Option<i64>> {
    let raw = self.get(column).ok_or_else(|| Error::MissingColumns {
      origin:  self.table.origin.clone(),
      missing: vec![column.to_owned()],
      found:   self.table.headers.clone(),
    })?;
    match policy.apply(raw) {
      Coercion::Value(n) => Ok(Some(n)),
      Coercion::DropRow => Ok(None),
      Coercion::Invalid => Err(Error::InvalidNumber {
        origin: self.table.origin.clone(),
        column: column.to_owned(),
        value:  raw.to_owned(),
      }),
    }
  }
}

/// Read and parse the file at `path`.
pub fn read_table(path: &Path, dialect: &Dialect) -> Result<WideTable> {
  let bytes = fs::read(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;
  let origin = path.display().to_string();
  let text = dialect.encoding.decode(&bytes, &origin)?;
  parse_table(&text, &origin, dialect)
}

/// Parse already-decoded text. `origin` names the input in errors.
pub fn parse_table(text: &str, origin: &str, dialect: &Dialect) -> Result<WideTable> {
  let body: String = text
    .split_inclusive('\n')
    .skip(dialect.header_row_offset)
    .collect();

  let mut reader = csv::ReaderBuilder::new()
    .delimiter(dialect.delimiter()?)
    .has_headers(true)
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(body.as_bytes());

  let csv_err = |source| Error::Csv { origin: origin.to_owned(), source };

  let headers: Vec<String> = reader
    .headers()
    .map_err(csv_err)?
    .iter()
    .map(|h| h.trim().to_owned())
    .collect();

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record.map_err(csv_err)?;
    rows.push(record.iter().map(str::to_owned).collect::<Vec<_>>());
  }

  let keep = rows.len().saturating_sub(dialect.footer_rows_to_drop);
  rows.truncate(keep);

  let table = WideTable { origin: origin.to_owned(), headers, rows };
  table.require(dialect.required_columns.as_slice())?;

  tracing::debug!(origin, rows = table.len(), columns = table.headers.len(), "parsed table");
  Ok(table)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_offset_and_footer_are_skipped() {
    let text = "Populacao por RA\nFonte: PDAD\nLocal;Total\nGuara;100\nGama;50\nTotal;150\nNota: estimativa\n";
    let dialect = Dialect::default().separator(';').skip_header_rows(2).drop_footer_rows(2);
    let table = parse_table(text, "pop.csv", &dialect).unwrap();

    assert_eq!(table.headers(), &["Local", "Total"]);
    let locals: Vec<_> = table.records().map(|r| r.get("Local").unwrap()).collect();
    assert_eq!(locals, vec!["Guara", "Gama"]);
  }

  #[test]
  fn header_names_and_cells_are_trimmed() {
    let text = " Ano Resultado ; 0 - 10 dias \n 2023 ; 4 \n";
    let table = parse_table(text, "t", &Dialect::default().separator(';')).unwrap();
    assert_eq!(table.column("Ano Resultado"), Some(0));
    let rec = table.records().next().unwrap();
    assert_eq!(rec.get("0 - 10 dias"), Some("4"));
  }

  #[test]
  fn missing_columns_are_all_listed() {
    let text = "ra,qtd_pet_ct\nGuara,1\n";
    let dialect = Dialect::default().require(&["ra", "qtd_gama_camara", "qtd_pet_ct", "ano"]);
    let err = parse_table(text, "equip.csv", &dialect).unwrap_err();
    match err {
      Error::MissingColumns { origin, missing, found } => {
        assert_eq!(origin, "equip.csv");
        assert_eq!(missing, vec!["qtd_gama_camara", "ano"]);
        assert_eq!(found, vec!["ra", "qtd_pet_ct"]);
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn short_records_read_as_empty() {
    let text = "a,b,c\n1\n";
    let table = parse_table(text, "t", &Dialect::default()).unwrap();
    let rec = table.records().next().unwrap();
    assert_eq!(rec.get("c"), Some(""));
    assert_eq!(rec.get("zzz"), None);
  }

  #[test]
  fn count_applies_policy() {
    let text = "n,m\n-5,x\n";
    let table = parse_table(text, "t", &Dialect::default()).unwrap();
    let rec = table.records().next().unwrap();
    assert_eq!(rec.count("n", CoercionPolicy::Fail).unwrap(), Some(0));
    assert_eq!(rec.count("m", CoercionPolicy::ZeroOnError).unwrap(), Some(0));
    assert_eq!(rec.count("m", CoercionPolicy::DropRowOnError).unwrap(), None);
    assert!(matches!(
      rec.count("m", CoercionPolicy::Fail),
      Err(Error::InvalidNumber { ref column, .. }) if column == "m"
    ));
  }

  #[test]
  fn count_of_absent_column_is_an_error() {
    let table = parse_table("n\n4\n", "t", &Dialect::default()).unwrap();
    let rec = table.records().next().unwrap();
    let err = rec.count("m", CoercionPolicy::ZeroOnError).unwrap_err();
    assert!(matches!(err, Error::MissingColumns { ref missing, .. } if missing == &["m"]));
  }

  #[test]
  fn missing_file_names_the_path() {
    let err = read_table(Path::new("/nonexistent/dados.csv"), &Dialect::default()).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/dados.csv"));
  }

  #[test]
  fn latin1_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ras.csv");
    fs::write(&path, b"ra\nCeil\xe2ndia\n").unwrap();
    let table = read_table(&path, &Dialect::default()).unwrap();
    assert_eq!(table.records().next().unwrap().get("ra"), Some("Ceilândia"));
  }
}
