//! Imaging equipment registered per administrative region.

use std::path::{Path, PathBuf};

use painel_core::{CanonicalName, dimension::DimensionMode, period::Period, store::LoadStore};
use painel_ingest::{CoercionPolicy, Dialect, WideToLong, ZeroPolicy};

use super::read_input;
use crate::{
  Result,
  config::EtlConfig,
  pipeline::{Context, FactLoad, load_candidates, run_files},
  resolver::Resolver,
  summary::DatasetSummary,
  tables::{EQUIPAMENTO_REGISTRADO, REGIAO, TIPO_EQUIPAMENTO},
};

pub const NAME: &str = "equipamentos";

/// Wide column → equipment type name.
pub const EQUIPMENT_COLUMNS: [(&str, &str); 18] = [
  ("qtd_gama_camara", "Gama Câmara"),
  ("qtd_mamografo_comando_simples", "Mamógrafo com Comando Simples"),
  ("qtd_mamografo_estereotaxia", "Mamógrafo com Estereotaxia"),
  ("qtd_raio_X_100_mA", "Raio X ate 100 mA"),
  ("qtd_raio_X_100_500_mA", "Raio X de 100 a 500 mA"),
  ("qtd_raio_X_mais_500_mA", "Raio X mais de 500mA"),
  ("qtd_raio_X_dentario", "Raio X Dentário"),
  ("qtd_raio_X_fluoroscopia", "Raio X com Fluoroscopia"),
  ("qtd_raio_X_densitometria_ossea", "Raio X para Densitometria Óssea"),
  ("qtd_raio_X_hemodinamica", "Raio X para Hemodinâmica"),
  ("qtd_tomografo_computadorizado", "Tomógrafo Computadorizado"),
  ("qtd_ressonancia_magnetica", "Ressonância Magnética"),
  ("qtd_ultrassom_doppler_colorido", "Ultrassom Doppler Colorido"),
  ("qtd_ultrassom_ecografo", "Ultrassom Ecógrafo"),
  ("qtd_ultrassom_convencional", "Ultrassom Convencional"),
  ("qtd_processadora_de_filme_mamografia", "Processadora De Filme Mamografia"),
  ("qtd_mamografo_computadorizado", "Mamógrafo Computadorizado"),
  ("qtd_pet_ct", "PET/CT"),
];

/// Reshape one region-per-row equipment file into one row per
/// (region, equipment type) with a positive count.
pub fn reshaper(columns: &[(&str, &str)]) -> WideToLong {
  WideToLong::new(columns, ZeroPolicy::SkipNonPositive, CoercionPolicy::ZeroOnError)
}

/// The load shared by every equipment file.
pub fn fact_load() -> FactLoad {
  FactLoad::new(EQUIPAMENTO_REGISTRADO)
    .dimension(REGIAO, DimensionMode::Closed)
    .dimension(TIPO_EQUIPAMENTO, DimensionMode::Closed)
}

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;
  let resolver = &mut ctx.resolver;

  let inputs = vec![config.data_file(&config.files.equipamentos)];
  run_files(NAME, inputs, async |path: &PathBuf| {
    load_equipment(resolver, store, config, path).await
  })
  .await
}

async fn load_equipment<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  config: &EtlConfig,
  path: &Path,
) -> Result<DatasetSummary> {
  let table = read_input(config, path, NAME, Dialect::default().require(&["ra"]))?;
  let period = Period::year(config.equipment_year);

  let shaped = reshaper(&EQUIPMENT_COLUMNS).reshape(&table, |record| {
    Some((vec![CanonicalName::titled(record.get("ra")?)?], period))
  })?;
  tracing::debug!(
    file = table.origin(),
    dropped = shaped.dropped_rows,
    skipped = shaped.skipped_cells,
    "reshaped equipment"
  );

  let mut summary = load_candidates(resolver, store, &fact_load(), shaped.rows).await?;
  summary.rows_read = table.len();
  Ok(summary)
}
