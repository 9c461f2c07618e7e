//! Conversions between painel values and SQLite column values.
//!
//! Dates are stored as ISO-8601 `YYYY-MM-DD` text. Identifiers are always
//! double-quoted since table and column names come from static descriptors,
//! never from input files.

use painel_core::fact::Cell;
use rusqlite::types::Value;

// ─── Cell ─────────────────────────────────────────────────────────────────────

pub fn encode_cell(cell: &Cell) -> Value {
  match cell {
    Cell::Null => Value::Null,
    Cell::Int(v) => Value::Integer(*v),
    Cell::Real(v) => Value::Real(*v),
    Cell::Text(v) => Value::Text(v.clone()),
    Cell::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
  }
}

pub fn encode_cells(cells: &[Cell]) -> Vec<Value> { cells.iter().map(encode_cell).collect() }

// ─── SQL text ────────────────────────────────────────────────────────────────

pub fn quote(ident: &str) -> String { format!("\"{}\"", ident.replace('"', "\"\"")) }

fn column_list(columns: &[&str]) -> String {
  columns.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ")
}

fn placeholders(n: usize) -> String {
  (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

/// `INSERT INTO table (cols...) VALUES (?1, ...)`.
pub fn insert_sql(table: &str, columns: &[&str]) -> String {
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    quote(table),
    column_list(columns),
    placeholders(columns.len()),
  )
}

/// Insert that overwrites every non-conflict column on a natural-key clash.
///
/// When every column is part of the conflict target there is nothing to
/// overwrite and the clash is ignored.
pub fn upsert_sql(table: &str, columns: &[&str], conflict: &[&str]) -> String {
  let updates: Vec<String> = columns
    .iter()
    .filter(|c| !conflict.contains(*c))
    .map(|c| format!("{0} = excluded.{0}", quote(c)))
    .collect();

  let action = if updates.is_empty() {
    "DO NOTHING".to_owned()
  } else {
    format!("DO UPDATE SET {}", updates.join(", "))
  };

  format!(
    "{} ON CONFLICT ({}) {action}",
    insert_sql(table, columns),
    column_list(conflict),
  )
}

/// `UPDATE table SET extra = ?1, ... WHERE key = ?n`.
pub fn update_extras_sql(table: &str, extras: &[&str], key_column: &str) -> String {
  let sets: Vec<String> = extras
    .iter()
    .enumerate()
    .map(|(i, c)| format!("{} = ?{}", quote(c), i + 1))
    .collect();
  format!(
    "UPDATE {} SET {} WHERE {} = ?{}",
    quote(table),
    sets.join(", "),
    quote(key_column),
    extras.len() + 1,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn upsert_updates_only_non_conflict_columns() {
    let sql = upsert_sql("espera_exame", &["id_uf", "ano", "qtd"], &["id_uf", "ano"]);
    assert_eq!(
      sql,
      "INSERT INTO \"espera_exame\" (\"id_uf\", \"ano\", \"qtd\") VALUES (?1, ?2, ?3) \
       ON CONFLICT (\"id_uf\", \"ano\") DO UPDATE SET \"qtd\" = excluded.\"qtd\""
    );
  }

  #[test]
  fn upsert_without_payload_does_nothing() {
    let sql = upsert_sql("t", &["a", "b"], &["a", "b"]);
    assert!(sql.ends_with("ON CONFLICT (\"a\", \"b\") DO NOTHING"));
  }

  #[test]
  fn update_extras_binds_key_last() {
    assert_eq!(
      update_extras_sql("tipo_equipamento", &["descricao", "quantidade_publico"], "chave"),
      "UPDATE \"tipo_equipamento\" SET \"descricao\" = ?1, \"quantidade_publico\" = ?2 \
       WHERE \"chave\" = ?3"
    );
  }

  #[test]
  fn dates_are_iso_text() {
    let d = chrono::NaiveDate::from_ymd_opt(2025, 11, 16).unwrap();
    assert_eq!(encode_cell(&Cell::Date(d)), Value::Text("2025-11-16".into()));
  }
}
