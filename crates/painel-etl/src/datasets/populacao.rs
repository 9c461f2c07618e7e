//! Population per administrative region, split by health-plan coverage.

use std::path::{Path, PathBuf};

use painel_core::{
  CanonicalName,
  dimension::DimensionMode,
  fact::{CandidateRow, Cell},
  period::Period,
  store::LoadStore,
};
use painel_ingest::{CoercionPolicy, Dialect, Record};

use super::read_input;
use crate::{
  Result,
  config::EtlConfig,
  pipeline::{Context, FactLoad, load_candidates, run_files},
  resolver::Resolver,
  summary::DatasetSummary,
  tables::{POPULACAO, REGIAO},
};

pub const NAME: &str = "populacao";

const REGION: &str = "Local";
/// Total, with a plan, without a plan.
const MEASURES: [&str; 3] = ["Total", "Sim", "Nao"];

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;
  let resolver = &mut ctx.resolver;

  let inputs = vec![config.data_file(&config.files.populacao)];
  run_files(NAME, inputs, async |path: &PathBuf| {
    load_population(resolver, store, config, path).await
  })
  .await
}

fn candidate(record: &Record<'_>, period: Period) -> Result<Option<CandidateRow>> {
  let Some(region) = record.get(REGION).and_then(CanonicalName::titled) else {
    return Ok(None);
  };
  let mut measures = Vec::with_capacity(MEASURES.len());
  for column in MEASURES {
    let n = record.count(column, CoercionPolicy::ZeroOnError)?.unwrap_or(0);
    measures.push(Cell::Int(n));
  }
  Ok(Some(CandidateRow { names: vec![region], period, measures }))
}

async fn load_population<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  config: &EtlConfig,
  path: &Path,
) -> Result<DatasetSummary> {
  let dialect = Dialect::default().separator(';').require(&[REGION]).require(MEASURES.as_slice());
  let table = read_input(config, path, NAME, dialect)?;
  let period = Period::year(config.population_year);

  let mut candidates = Vec::with_capacity(table.len());
  for record in table.records() {
    if let Some(row) = candidate(&record, period)? {
      candidates.push(row);
    }
  }

  let load = FactLoad::new(POPULACAO).dimension(REGIAO, DimensionMode::Closed);
  let mut summary = load_candidates(resolver, store, &load, candidates).await?;
  summary.rows_read = table.len();
  Ok(summary)
}
