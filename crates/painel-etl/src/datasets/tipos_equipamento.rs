//! Equipment types with their public/private split, refreshed from the
//! national per-type counts.

use std::path::{Path, PathBuf};

use painel_core::{CanonicalName, dimension::Member, fact::Cell, store::LoadStore};
use painel_ingest::{CoercionPolicy, Dialect, Record};

use super::read_input;
use crate::{
  Error, Result,
  config::EtlConfig,
  pipeline::{Context, run_files},
  summary::DatasetSummary,
  tables::TIPO_EQUIPAMENTO_SEED,
};

pub const NAME: &str = "tipos-equipamento";

const COLUMNS: [&str; 6] =
  ["codigo", "equipamento", "existentes", "em_uso", "existentes_SUS", "em_uso_SUS"];

/// Counts derived for one equipment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
  pub publico:     i64,
  pub privado:     i64,
  pub funcionando: i64,
  pub parado:      i64,
}

impl Split {
  pub fn new(existentes: i64, existentes_sus: i64, em_uso_sus: i64) -> Self {
    Self {
      publico:     existentes_sus,
      privado:     (existentes - existentes_sus).max(0),
      funcionando: em_uso_sus,
      parado:      (existentes_sus - em_uso_sus).max(0),
    }
  }

  fn cells(self) -> Vec<Cell> {
    vec![
      Cell::Int(self.publico),
      Cell::Int(self.privado),
      Cell::Int(self.funcionando),
      Cell::Int(self.parado),
    ]
  }
}

fn count(record: &Record<'_>, column: &str) -> Result<i64> {
  Ok(record.count(column, CoercionPolicy::ZeroOnError)?.unwrap_or(0))
}

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;

  let inputs = vec![config.data_file(&config.files.tipos_equipamento)];
  run_files(NAME, inputs, async |path: &PathBuf| load_types(store, config, path).await).await
}

async fn load_types<S: LoadStore>(store: &S, config: &EtlConfig, path: &Path) -> Result<DatasetSummary> {
  let dialect = Dialect::default().require(COLUMNS.as_slice());
  let table = read_input(config, path, NAME, dialect)?;

  let mut members = Vec::with_capacity(table.len());
  for record in table.records() {
    let Some(name) = record.get("equipamento").and_then(CanonicalName::new) else {
      continue;
    };
    let split = Split::new(
      count(&record, "existentes")?,
      count(&record, "existentes_SUS")?,
      count(&record, "em_uso_SUS")?,
    );
    members.push(Member::with_extras(name, split.cells()));
  }

  let mut summary = DatasetSummary::new(NAME);
  summary.rows_read = table.len();
  summary.rows_shaped = members.len();
  summary.rows_resolved = members.len();

  let counts = store
    .refresh(TIPO_EQUIPAMENTO_SEED, members)
    .await
    .map_err(Error::store)?;
  summary.rows_written = counts.inserted + counts.updated;
  summary.dimension_inserts = counts.inserted;

  tracing::info!(
    file = table.origin(),
    inserted = counts.inserted,
    updated = counts.updated,
    "refreshed equipment types"
  );
  summary.record_conflicts(TIPO_EQUIPAMENTO_SEED.table, counts.conflicts);
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split_never_goes_negative() {
    assert_eq!(Split::new(10, 6, 4), Split { publico: 6, privado: 4, funcionando: 4, parado: 2 });
    assert_eq!(Split::new(3, 5, 7), Split { publico: 5, privado: 0, funcionando: 7, parado: 0 });
  }
}
