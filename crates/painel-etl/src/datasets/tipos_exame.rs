//! Exam types, derived from the numeric column headers of the
//! requested-exams history.

use std::{
  path::{Path, PathBuf},
  sync::LazyLock,
};

use painel_core::{
  CanonicalName,
  dimension::DimensionMode,
  normalize::title_case,
  store::LoadStore,
};
use painel_ingest::{Dialect, WideTable, coerce::parse_score};
use regex::Regex;

use super::read_input;
use crate::{
  Result,
  config::EtlConfig,
  pipeline::{Context, run_files},
  resolver::Resolver,
  summary::DatasetSummary,
  tables::TIPO_EXAME,
};

pub const NAME: &str = "tipos-exame";

/// Exam type that never appears as a header but is referenced by the
/// wait-time and volume datasets.
pub const MAMMOGRAPHY: &str = "Diagnostico Por Mamografia";

const IGNORED_COLUMNS: [&str; 2] = ["Ano atendimento", "Total"];

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static PARENTHESIZED: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));

/// Turn a header such as `"0204 - RADIOLOGIA (RX)"` into `"Radiologia"`.
pub fn clean_exam_name(header: &str) -> String {
  let lowered = header.trim().to_lowercase();
  let no_digits = DIGITS.replace_all(&lowered, "");
  let spaced = no_digits.replace(['_', '-'], " ");
  let bare = PARENTHESIZED.replace_all(&spaced, "");
  let collapsed = bare.split_whitespace().collect::<Vec<_>>().join(" ");
  title_case(&collapsed)
}

/// Headers whose every non-blank cell is a number.
fn numeric_columns(table: &WideTable) -> Vec<&str> {
  table
    .headers()
    .iter()
    .enumerate()
    .filter(|(_, h)| !IGNORED_COLUMNS.contains(&h.as_str()) && !h.is_empty())
    .filter(|(idx, _)| {
      table.records().all(|r| {
        let cell = r.field(*idx).trim();
        cell.is_empty() || parse_score(cell).is_some()
      })
    })
    .map(|(_, h)| h.as_str())
    .collect()
}

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;
  let resolver = &mut ctx.resolver;

  let inputs = vec![config.data_file(&config.files.tipos_exame)];
  run_files(NAME, inputs, async |path: &PathBuf| {
    load_exam_types(resolver, store, config, path).await
  })
  .await
}

async fn load_exam_types<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  config: &EtlConfig,
  path: &Path,
) -> Result<DatasetSummary> {
  let table = read_input(config, path, NAME, Dialect::default().separator(';'))?;

  let columns = numeric_columns(&table);
  tracing::debug!(file = table.origin(), ?columns, "exam columns detected");

  let names: Vec<CanonicalName> = columns
    .iter()
    .map(|c| clean_exam_name(c))
    .chain(std::iter::once(MAMMOGRAPHY.to_owned()))
    .filter_map(|n| CanonicalName::new(&n))
    .collect();

  let mut summary = DatasetSummary::new(NAME);
  summary.rows_read = table.headers().len();
  summary.rows_shaped = names.len();

  let resolution = resolver
    .resolve(store, TIPO_EXAME, names, DimensionMode::Open)
    .await?;
  summary.rows_resolved = resolution.keys.len();
  summary.rows_written = resolution.inserted;
  summary.dimension_inserts = resolution.inserted;
  summary.record_conflicts(TIPO_EXAME.table, resolution.conflicts);

  tracing::info!(file = table.origin(), inserted = resolution.inserted, "loaded exam types");
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use painel_ingest::parse_table;

  use super::*;

  #[test]
  fn headers_are_cleaned() {
    assert_eq!(clean_exam_name("0204 - RADIOLOGIA (RX)"), "Radiologia");
    assert_eq!(clean_exam_name("  ultra_sonografia  "), "Ultra Sonografia");
    assert_eq!(clean_exam_name("0205 Ultra-Sonografia"), "Ultra Sonografia");
  }

  #[test]
  fn only_numeric_columns_are_exams() {
    let text = "Ano atendimento;Radiologia;Obs;Tomografia;Total\n\
                2020;10;texto;;15\n\
                2021;7,5;;3;10\n";
    let table = parse_table(text, "grupos.csv", &Dialect::default().separator(';')).unwrap();
    assert_eq!(numeric_columns(&table), vec!["Radiologia", "Tomografia"]);
  }
}
