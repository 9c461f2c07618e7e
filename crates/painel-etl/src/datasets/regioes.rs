//! Administrative regions of the Federal District, collected from the name
//! columns of two extracts.

use std::path::{Path, PathBuf};

use painel_core::{
  CanonicalName,
  dimension::{DimensionKey, Member},
  fact::Cell,
  store::LoadStore,
};
use painel_ingest::Dialect;

use super::{read_input, require};
use crate::{
  Error, Result,
  config::EtlConfig,
  pipeline::{Context, run_files},
  summary::DatasetSummary,
  tables::{REGIAO_SEED, UF},
};

pub const NAME: &str = "regioes";

/// One extract and the column holding region names.
struct Source {
  slot:    &'static str,
  path:    PathBuf,
  column:  &'static str,
  dialect: Dialect,
}

impl AsRef<Path> for Source {
  fn as_ref(&self) -> &Path { &self.path }
}

fn sources(config: &EtlConfig) -> Vec<Source> {
  vec![
    Source {
      slot:    "regioes.equipamentos",
      path:    config.data_file(&config.files.regioes_equipamentos),
      column:  "ra",
      dialect: Dialect::default(),
    },
    Source {
      slot:    "regioes.populacao",
      path:    config.data_file(&config.files.regioes_populacao),
      column:  "Local",
      dialect: Dialect::default().skip_header_rows(1).drop_footer_rows(2),
    },
  ]
}

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;

  let df = match require(&mut ctx.resolver, store, UF, "DF").await {
    Ok(df) => df,
    Err(err) => return DatasetSummary::from_error(NAME, Path::new(UF.table), err),
  };

  run_files(NAME, sources(config), async |source: &Source| {
    load_source(store, config, df, source).await
  })
  .await
}

async fn load_source<S: LoadStore>(
  store: &S,
  config: &EtlConfig,
  df: DimensionKey,
  source: &Source,
) -> Result<DatasetSummary> {
  let table = read_input(config, &source.path, source.slot, source.dialect.clone())?;
  table.require([source.column].as_slice())?;

  let members: Vec<Member> = table
    .records()
    .filter_map(|r| CanonicalName::titled(r.get(source.column)?))
    .map(|name| Member::with_extras(name, vec![Cell::Int(df)]))
    .collect();

  let mut summary = DatasetSummary::new(NAME);
  summary.rows_read = table.len();
  summary.rows_shaped = members.len();

  let resolution = store.seed(REGIAO_SEED, members).await.map_err(Error::store)?;
  summary.rows_resolved = resolution.keys.len();
  summary.rows_written = resolution.inserted;
  summary.dimension_inserts = resolution.inserted;
  summary.record_conflicts(REGIAO_SEED.table, resolution.conflicts);

  tracing::info!(file = table.origin(), inserted = resolution.inserted, "seeded regions");
  Ok(summary)
}
