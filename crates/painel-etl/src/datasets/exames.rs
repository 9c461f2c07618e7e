//! Monthly mammography volume in the Federal District.

use std::path::{Path, PathBuf};

use painel_core::{
  dimension::DimensionKey,
  fact::{CandidateRow, Cell},
  period::PeriodFormat,
  store::LoadStore,
};
use painel_ingest::{CoercionPolicy, Dialect, Record};

use super::{read_input, require, tipos_exame::MAMMOGRAPHY};
use crate::{
  Result,
  config::EtlConfig,
  pipeline::{Context, FactLoad, load_candidates, run_files},
  resolver::Resolver,
  summary::DatasetSummary,
  tables::{EXAME_REALIZADO, TIPO_EXAME, UF},
};

pub const NAME: &str = "exames";

const PERIOD: &str = "Mes/Ano";
const VOLUME: &str = "Exames";

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;
  let resolver = &mut ctx.resolver;

  let path = config.data_file(&config.files.exames);
  let keys = match fixed_keys(resolver, store).await {
    Ok(keys) => keys,
    Err(err) => return DatasetSummary::from_error(NAME, &path, err),
  };

  run_files(NAME, vec![path], async |path: &PathBuf| {
    load_volume(resolver, store, config, keys, path).await
  })
  .await
}

/// Keys of the mammography exam type and of the Federal District.
async fn fixed_keys<S: LoadStore>(resolver: &mut Resolver, store: &S) -> Result<[DimensionKey; 2]> {
  let exam = require(resolver, store, TIPO_EXAME, MAMMOGRAPHY).await?;
  let df = require(resolver, store, UF, "DF").await?;
  Ok([exam, df])
}

/// One row per record with a parseable month and a numeric volume.
fn candidate(record: &Record<'_>) -> Result<Option<CandidateRow>> {
  let Some(period) = record.get(PERIOD).and_then(|raw| PeriodFormat::MonthNameYear.parse(raw))
  else {
    return Ok(None);
  };
  let Some(volume) = record.count(VOLUME, CoercionPolicy::DropRowOnError)? else {
    return Ok(None);
  };
  Ok(Some(CandidateRow { names: Vec::new(), period, measures: vec![Cell::Int(volume)] }))
}

async fn load_volume<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  config: &EtlConfig,
  [exam, df]: [DimensionKey; 2],
  path: &Path,
) -> Result<DatasetSummary> {
  let table = read_input(config, path, NAME, Dialect::default().require(&[PERIOD, VOLUME]))?;

  let mut candidates = Vec::with_capacity(table.len());
  for record in table.records() {
    if let Some(row) = candidate(&record)? {
      candidates.push(row);
    }
  }

  let load = FactLoad::new(EXAME_REALIZADO).fixed_key(exam).fixed_key(df);
  let mut summary = load_candidates(resolver, store, &load, candidates).await?;
  summary.rows_read = table.len();
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use painel_core::period::Period;
  use painel_ingest::parse_table;

  use super::*;

  #[test]
  fn unparseable_months_and_volumes_drop_the_row() {
    let text = "Mes/Ano,Exames\n\
                MARÇO/2023,1520\n\
                Total,9000\n\
                Abril/2023,\n\
                Maio/2023,88.0\n";
    let table = parse_table(text, "mamografias.csv", &Dialect::default()).unwrap();

    let rows: Vec<CandidateRow> = table
      .records()
      .filter_map(|r| candidate(&r).unwrap())
      .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].period, Period::year_month(2023, 3).unwrap());
    assert_eq!(rows[1].measures, vec![Cell::Int(88)]);
  }
}
