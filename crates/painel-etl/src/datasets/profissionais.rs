//! Monthly headcounts of radiology professionals in the Federal District.
//!
//! Three extracts, one column per professional category and one period
//! column in `2023/mar.` form.

use std::path::{Path, PathBuf};

use painel_core::{
  dimension::{DimensionKey, DimensionMode},
  period::PeriodFormat,
  store::LoadStore,
};
use painel_ingest::{CoercionPolicy, Dialect, WideToLong, ZeroPolicy};

use super::{read_input, require};
use crate::{
  Result,
  config::EtlConfig,
  pipeline::{Context, FactLoad, load_candidates, run_files},
  resolver::Resolver,
  summary::DatasetSummary,
  tables::{CATEGORIA, PROFISSIONAL_REGISTRADO, UF},
};

pub const NAME: &str = "profissionais";

/// Columns of the headcount extracts that are not professional categories.
pub const NON_CATEGORY_COLUMNS: [&str; 4] =
  ["Ocupações de Nível Superior", "Data", "Total", "Ano/mês compet."];

/// One headcount extract.
pub(crate) struct Extract {
  pub slot:          &'static str,
  pub path:          PathBuf,
  pub period_column: &'static str,
}

impl AsRef<Path> for Extract {
  fn as_ref(&self) -> &Path { &self.path }
}

pub(crate) fn extracts(config: &EtlConfig) -> Vec<Extract> {
  vec![
    Extract {
      slot:          "profissionais.medicos",
      path:          config.data_file(&config.files.profissionais_medicos),
      period_column: "Ano/mês compet.",
    },
    Extract {
      slot:          "profissionais.dentistas",
      path:          config.data_file(&config.files.profissionais_dentistas),
      period_column: "Ocupações de Nível Superior",
    },
    Extract {
      slot:          "profissionais.tecnicos",
      path:          config.data_file(&config.files.profissionais_tecnicos),
      period_column: "Data",
    },
  ]
}

/// Category columns of a headcount header.
pub(crate) fn category_columns(headers: &[String]) -> WideToLong {
  WideToLong::from_headers_except(
    headers,
    &NON_CATEGORY_COLUMNS,
    ZeroPolicy::KeepZero,
    CoercionPolicy::DropRowOnError,
  )
}

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;
  let resolver = &mut ctx.resolver;

  let df = match require(resolver, store, UF, "DF").await {
    Ok(df) => df,
    Err(err) => return DatasetSummary::from_error(NAME, Path::new(UF.table), err),
  };

  run_files(NAME, extracts(config), async |extract: &Extract| {
    load_extract(resolver, store, config, df, extract).await
  })
  .await
}

async fn load_extract<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  config: &EtlConfig,
  df: DimensionKey,
  extract: &Extract,
) -> Result<DatasetSummary> {
  let dialect = Dialect::default().require(&[extract.period_column]);
  let table = read_input(config, &extract.path, extract.slot, dialect)?;

  let shaped = category_columns(table.headers()).reshape(&table, |record| {
    let period = PeriodFormat::YearMonthAbbrev.parse(record.get(extract.period_column)?)?;
    Some((Vec::new(), period))
  })?;

  let load = FactLoad::new(PROFISSIONAL_REGISTRADO)
    .dimension(CATEGORIA, DimensionMode::Closed)
    .fixed_key(df);

  let mut summary = load_candidates(resolver, store, &load, shaped.rows).await?;
  summary.rows_read = table.len();
  Ok(summary)
}
