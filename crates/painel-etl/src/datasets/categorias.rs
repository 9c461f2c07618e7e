//! Professional categories, taken from the column headers of the headcount
//! extracts.

use painel_core::{CanonicalName, dimension::DimensionMode, store::LoadStore};
use painel_ingest::Dialect;

use super::{
  profissionais::{Extract, category_columns, extracts},
  read_input,
};
use crate::{
  Result,
  config::EtlConfig,
  pipeline::{Context, run_files},
  resolver::Resolver,
  summary::DatasetSummary,
  tables::CATEGORIA,
};

pub const NAME: &str = "categorias";

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;
  let resolver = &mut ctx.resolver;

  run_files(NAME, extracts(config), async |extract: &Extract| {
    load_headers(resolver, store, config, extract).await
  })
  .await
}

async fn load_headers<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  config: &EtlConfig,
  extract: &Extract,
) -> Result<DatasetSummary> {
  let table = read_input(config, &extract.path, extract.slot, Dialect::default())?;
  let names: Vec<CanonicalName> = category_columns(table.headers())
    .columns
    .iter()
    .filter_map(|c| CanonicalName::new(&c.label))
    .collect();

  let mut summary = DatasetSummary::new(NAME);
  summary.rows_read = table.headers().len();
  summary.rows_shaped = names.len();

  let resolution = resolver
    .resolve(store, CATEGORIA, names, DimensionMode::Open)
    .await?;
  summary.rows_resolved = resolution.keys.len();
  summary.rows_written = resolution.inserted;
  summary.dimension_inserts = resolution.inserted;
  summary.record_conflicts(CATEGORIA.table, resolution.conflicts);

  tracing::info!(file = table.origin(), categories = summary.rows_shaped, "collected categories");
  Ok(summary)
}
