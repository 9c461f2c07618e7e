//! The datasets `painel-etl` knows how to load.
//!
//! Each module reads its inputs, shapes them and hands them to the
//! [`pipeline`](crate::pipeline). Failures are recorded per input file in
//! the returned summary, so a dataset never aborts the run.

use std::{fmt, path::Path, str::FromStr};

use painel_core::{
  CanonicalName,
  dimension::{Dimension, DimensionKey},
  store::LoadStore,
};
use painel_ingest::{Dialect, WideTable, read_table};

use crate::{
  Error, Result, config::EtlConfig, pipeline::Context, resolver::Resolver,
  summary::DatasetSummary,
};

pub mod categorias;
pub mod equipamentos;
pub mod espera_exames;
pub mod exames;
pub mod populacao;
pub mod profissionais;
pub mod regioes;
pub mod tipos_equipamento;
pub mod tipos_exame;
pub mod uf;
pub mod wave;

/// A named dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
  Uf,
  Regioes,
  Categorias,
  TiposExame,
  TiposEquipamento,
  Equipamentos,
  Populacao,
  EsperaExames,
  Exames,
  Profissionais,
  Wave,
}

impl Dataset {
  /// Every dataset, reference data before the facts that point at it.
  pub const ALL: [Dataset; 11] = [
    Dataset::Uf,
    Dataset::Regioes,
    Dataset::Categorias,
    Dataset::TiposExame,
    Dataset::TiposEquipamento,
    Dataset::Equipamentos,
    Dataset::Populacao,
    Dataset::EsperaExames,
    Dataset::Exames,
    Dataset::Profissionais,
    Dataset::Wave,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Dataset::Uf => uf::NAME,
      Dataset::Regioes => regioes::NAME,
      Dataset::Categorias => categorias::NAME,
      Dataset::TiposExame => tipos_exame::NAME,
      Dataset::TiposEquipamento => tipos_equipamento::NAME,
      Dataset::Equipamentos => equipamentos::NAME,
      Dataset::Populacao => populacao::NAME,
      Dataset::EsperaExames => espera_exames::NAME,
      Dataset::Exames => exames::NAME,
      Dataset::Profissionais => profissionais::NAME,
      Dataset::Wave => wave::NAME,
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Dataset::Uf => "federative units (built-in list)",
      Dataset::Regioes => "administrative regions of the Federal District",
      Dataset::Categorias => "professional categories from headcount headers",
      Dataset::TiposExame => "exam types from the requested-exams history",
      Dataset::TiposEquipamento => "equipment types with public/private counts",
      Dataset::Equipamentos => "equipment registered per region",
      Dataset::Populacao => "population with and without a health plan",
      Dataset::EsperaExames => "mammography wait-time buckets per federative unit",
      Dataset::Exames => "monthly mammography volume",
      Dataset::Profissionais => "monthly radiology professional headcounts",
      Dataset::Wave => "portal accessibility audit",
    }
  }

  pub async fn run<S: LoadStore>(self, ctx: &mut Context<'_, S>) -> DatasetSummary {
    match self {
      Dataset::Uf => uf::run(ctx).await,
      Dataset::Regioes => regioes::run(ctx).await,
      Dataset::Categorias => categorias::run(ctx).await,
      Dataset::TiposExame => tipos_exame::run(ctx).await,
      Dataset::TiposEquipamento => tipos_equipamento::run(ctx).await,
      Dataset::Equipamentos => equipamentos::run(ctx).await,
      Dataset::Populacao => populacao::run(ctx).await,
      Dataset::EsperaExames => espera_exames::run(ctx).await,
      Dataset::Exames => exames::run(ctx).await,
      Dataset::Profissionais => profissionais::run(ctx).await,
      Dataset::Wave => wave::run(ctx).await,
    }
  }
}

impl fmt::Display for Dataset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Dataset {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Dataset::ALL
      .into_iter()
      .find(|d| d.name() == s)
      .ok_or_else(|| Error::UnknownDataset(s.to_owned()))
  }
}

/// Read an input through the dialect configured for `slot`.
fn read_input(config: &EtlConfig, path: &Path, slot: &str, default: Dialect) -> Result<WideTable> {
  let dialect = config.dialect(slot, default);
  Ok(read_table(path, &dialect)?)
}

/// Key of a fixed reference spelled as a literal.
async fn require<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  dimension: Dimension,
  name: &str,
) -> Result<DimensionKey> {
  let canonical = CanonicalName::new(name).ok_or_else(|| Error::MissingReference {
    dimension: dimension.table,
    name:      name.to_owned(),
  })?;
  resolver.require(store, dimension, &canonical).await
}
