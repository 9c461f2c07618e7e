//! Orchestration: resolve candidate rows, write facts, isolate failures.

use std::path::Path;

use painel_core::{
  dimension::{Dimension, DimensionKey, DimensionMode, Resolution},
  fact::{CandidateRow, FactRow, FactTable},
  store::LoadStore,
};

use crate::{
  Error, Result,
  config::EtlConfig,
  datasets::Dataset,
  resolver::Resolver,
  summary::{DatasetSummary, RunSummary},
};

/// How candidate rows become rows of one fact table.
///
/// `names[i]` of each candidate is resolved against `dimensions[i]`. The
/// resulting keys, followed by `fixed_keys`, must line up with the table's
/// key columns.
#[derive(Debug, Clone)]
pub struct FactLoad {
  pub table:      FactTable,
  pub dimensions: Vec<(Dimension, DimensionMode)>,
  pub fixed_keys: Vec<DimensionKey>,
}

impl FactLoad {
  pub fn new(table: FactTable) -> Self {
    Self { table, dimensions: Vec::new(), fixed_keys: Vec::new() }
  }

  pub fn dimension(mut self, dimension: Dimension, mode: DimensionMode) -> Self {
    self.dimensions.push((dimension, mode));
    self
  }

  pub fn fixed_key(mut self, key: DimensionKey) -> Self {
    self.fixed_keys.push(key);
    self
  }
}

/// State shared by the datasets of one run.
pub struct Context<'a, S> {
  pub store:    &'a S,
  pub config:   &'a EtlConfig,
  pub resolver: Resolver,
}

impl<'a, S: LoadStore> Context<'a, S> {
  pub fn new(store: &'a S, config: &'a EtlConfig) -> Self {
    Self { store, config, resolver: Resolver::new() }
  }
}

/// Resolve, filter and write `candidates`.
///
/// Rows with any unresolved name are excluded and their names recorded.
/// The returned summary covers everything from `rows_shaped` on.
pub async fn load_candidates<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  load: &FactLoad,
  candidates: Vec<CandidateRow>,
) -> Result<DatasetSummary> {
  let mut summary = DatasetSummary::new(load.table.table);
  summary.rows_shaped = candidates.len();

  if let Some(bad) = candidates.iter().find(|c| c.names.len() != load.dimensions.len()) {
    return Err(Error::CandidateArity {
      table:    load.table.table,
      expected: load.dimensions.len(),
      found:    bad.names.len(),
    });
  }

  let mut resolutions: Vec<Resolution> = Vec::with_capacity(load.dimensions.len());
  for (idx, &(dimension, mode)) in load.dimensions.iter().enumerate() {
    let names = candidates.iter().map(|c| c.names[idx].clone());
    let resolution = resolver.resolve(store, dimension, names, mode).await?;

    summary.dimension_inserts += resolution.inserted;
    summary.record_unresolved(dimension.table, resolution.unresolved.iter().cloned());
    summary.record_conflicts(dimension.table, resolution.conflicts.iter().cloned());
    resolutions.push(resolution);
  }

  let rows: Vec<FactRow> = candidates
    .into_iter()
    .filter_map(|candidate| {
      let mut keys = candidate
        .names
        .iter()
        .zip(&resolutions)
        .map(|(name, resolution)| resolution.get(name))
        .collect::<Option<Vec<_>>>()?;
      keys.extend_from_slice(&load.fixed_keys);
      Some(FactRow { keys, period: candidate.period, measures: candidate.measures })
    })
    .collect();

  summary.rows_resolved = rows.len();
  summary.rows_written = store.upsert(load.table, rows).await.map_err(Error::store)?;

  if !summary.unresolved.is_empty() {
    tracing::warn!(
      table = load.table.table,
      excluded = summary.rows_shaped - summary.rows_resolved,
      names = summary.unresolved.len(),
      "rows excluded for unresolved names"
    );
  }
  tracing::info!(
    table = load.table.table,
    shaped = summary.rows_shaped,
    written = summary.rows_written,
    "loaded facts"
  );
  Ok(summary)
}

/// Run `load` on every input, recording failures instead of propagating
/// them.
pub async fn run_files<I, F>(dataset: &str, inputs: Vec<I>, mut load: F) -> DatasetSummary
where
  I: AsRef<Path>,
  F: AsyncFnMut(&I) -> Result<DatasetSummary>,
{
  let mut summary = DatasetSummary::new(dataset);
  for input in inputs {
    let file = input.as_ref();
    match load(&input).await {
      Ok(part) => summary.merge(part),
      Err(error) => {
        tracing::error!(dataset, file = %file.display(), %error, "file failed");
        summary.record_error(file, error);
      }
    }
  }
  summary
}

/// Run `datasets` in order against `store`.
pub async fn run<S: LoadStore>(store: &S, config: &EtlConfig, datasets: &[Dataset]) -> RunSummary {
  let mut run = RunSummary::new();
  let mut ctx = Context::new(store, config);

  tracing::info!(run_id = %run.run_id, datasets = datasets.len(), "run started");
  for dataset in datasets {
    let summary = dataset.run(&mut ctx).await;
    tracing::info!(
      dataset = dataset.name(),
      written = summary.rows_written,
      failed = summary.failed(),
      "dataset finished"
    );
    run.datasets.push(summary);
  }
  run
}
