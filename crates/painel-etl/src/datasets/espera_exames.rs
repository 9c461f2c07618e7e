//! Mammography wait-time buckets, one file per federative unit.
//!
//! The unit comes from the file name (`mamografia_atendSP.csv`), so a
//! badly named file fails on its own without touching the others. Rows are
//! upserted on (unit, exam, year): re-running the load overwrites.

use std::path::{Path, PathBuf};

use painel_core::{
  dimension::DimensionKey,
  fact::{CandidateRow, Cell},
  period::{Period, parse_year},
  store::LoadStore,
};
use painel_ingest::{CoercionPolicy, Dialect, FilenameCode, Record};

use super::{read_input, require, tipos_exame::MAMMOGRAPHY};
use crate::{
  Error, Result,
  config::EtlConfig,
  pipeline::{Context, FactLoad, load_candidates, run_files},
  resolver::Resolver,
  summary::DatasetSummary,
  tables::{ESPERA_EXAME, TIPO_EXAME, UF},
};

pub const NAME: &str = "espera-exames";

const YEAR: &str = "Ano Resultado";
const BUCKETS: [&str; 4] = ["0 - 10 dias", "11 - 20 dias", "21 - 30 dias", "> 30 dias"];

fn unit_code() -> FilenameCode { FilenameCode::new("mamografia_atend", ".csv", 2) }

/// Matching files in lexical order.
fn input_files(config: &EtlConfig) -> Result<Vec<PathBuf>> {
  let dir = config.data_dir.join(&config.files.espera_dir);
  let dir = glob::Pattern::escape(&dir.to_string_lossy());
  let pattern = Path::new(&dir).join(&config.files.espera_pattern);
  let pattern = pattern.to_string_lossy();

  let mut files = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
  if files.is_empty() {
    return Err(Error::NoFiles(pattern.into_owned()));
  }
  files.sort();
  Ok(files)
}

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;
  let resolver = &mut ctx.resolver;

  let files = match input_files(config) {
    Ok(files) => files,
    Err(err) => {
      let dir = config.data_dir.join(&config.files.espera_dir);
      return DatasetSummary::from_error(NAME, &dir, err);
    }
  };
  tracing::info!(files = files.len(), "wait-time files found");

  let exam = match require(resolver, store, TIPO_EXAME, MAMMOGRAPHY).await {
    Ok(exam) => exam,
    Err(err) => return DatasetSummary::from_error(NAME, Path::new(TIPO_EXAME.table), err),
  };

  run_files(NAME, files, async |path: &PathBuf| {
    load_unit(resolver, store, config, exam, path).await
  })
  .await
}

fn candidate(record: &Record<'_>) -> Result<Option<CandidateRow>> {
  let Some(year) = record.get(YEAR).and_then(parse_year) else {
    return Ok(None);
  };
  let mut measures = Vec::with_capacity(BUCKETS.len());
  for bucket in BUCKETS {
    let n = record.count(bucket, CoercionPolicy::ZeroOnError)?.unwrap_or(0);
    measures.push(Cell::Int(n));
  }
  Ok(Some(CandidateRow { names: Vec::new(), period: Period::year(year), measures }))
}

async fn load_unit<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  config: &EtlConfig,
  exam: DimensionKey,
  path: &Path,
) -> Result<DatasetSummary> {
  let code = unit_code().extract(path)?;
  let unit = require(resolver, store, UF, &code).await?;

  let dialect = Dialect::default().separator(';').require(&[YEAR]).require(BUCKETS.as_slice());
  let table = read_input(config, path, NAME, dialect)?;

  let mut candidates = Vec::with_capacity(table.len());
  for record in table.records() {
    if let Some(row) = candidate(&record)? {
      candidates.push(row);
    }
  }
  tracing::debug!(unit = %code, rows = candidates.len(), "wait-time rows shaped");

  let load = FactLoad::new(ESPERA_EXAME).fixed_key(unit).fixed_key(exam);
  let mut summary = load_candidates(resolver, store, &load, candidates).await?;
  summary.rows_read = table.len();
  Ok(summary)
}
