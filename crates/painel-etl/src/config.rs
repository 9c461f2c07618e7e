//! Runtime configuration.
//!
//! Layered the usual way: built-in defaults, then an optional TOML file,
//! then `PAINEL_*` environment variables (`__` separates nested keys, e.g.
//! `PAINEL_FILES__WAVE=auditoria.csv`).

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

use chrono::NaiveDate;
use painel_ingest::Dialect;
use serde::Deserialize;

use crate::Result;

/// Settings for one `painel-etl` invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
  /// SQLite database file, created if absent.
  pub database:             PathBuf,
  /// Directory every file name below is relative to.
  pub data_dir:             PathBuf,
  /// Year the equipment inventory refers to.
  pub equipment_year:       i32,
  /// Year of the population survey.
  pub population_year:      i32,
  /// Date the accessibility audit was collected.
  pub wave_collection_date: NaiveDate,
  pub files:                FileNames,
  /// Dialect overrides by input slot (`"regioes.populacao"`, `"wave"`...).
  /// An override replaces the built-in dialect of that slot entirely.
  pub dialects:             HashMap<String, Dialect>,
}

impl Default for EtlConfig {
  fn default() -> Self {
    Self {
      database:             PathBuf::from("painel.db"),
      data_dir:             PathBuf::from("data"),
      equipment_year:       2025,
      population_year:      2021,
      wave_collection_date: NaiveDate::from_ymd_opt(2025, 11, 16).unwrap_or_default(),
      files:                FileNames::default(),
      dialects:             HashMap::new(),
    }
  }
}

/// Input file names, relative to [`EtlConfig::data_dir`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileNames {
  pub equipamentos:            String,
  pub regioes_equipamentos:    String,
  pub regioes_populacao:       String,
  pub populacao:               String,
  pub tipos_equipamento:       String,
  pub tipos_exame:             String,
  /// Directory holding one wait-time file per federative unit.
  pub espera_dir:              String,
  pub espera_pattern:          String,
  pub exames:                  String,
  pub profissionais_medicos:   String,
  pub profissionais_dentistas: String,
  pub profissionais_tecnicos:  String,
  pub wave:                    String,
}

impl Default for FileNames {
  fn default() -> Self {
    Self {
      equipamentos:            "dirty_data_distribuição_geo_equipamentos.csv".into(),
      regioes_equipamentos:    "dirty_data_distribuição_geografica_equipamentos_DF.csv".into(),
      regioes_populacao:       "dirty_data_populacao_DF_com_plano_saude_por_RA.csv".into(),
      populacao:               "dirty_data_pop_df_com_plano_saude_por_ra.csv".into(),
      tipos_equipamento:       "dirty_data_qtd_equip_img_SUS_por_tipo.csv".into(),
      tipos_exame:             "dirty_data_historico_grupos_exames_img_mais_requisitados.csv".into(),
      espera_dir:              "dirty_data_estados_espera_mamografia".into(),
      espera_pattern:          "mamografia_atend*.csv".into(),
      exames:                  "dirty_data_qtd_mamografias_df.csv".into(),
      profissionais_medicos:   "dirty_data_historico_anual_numero_medicos_radiologistas_e_diagnostico_imagem_SUS - cnes.csv".into(),
      profissionais_dentistas: "dirty_data_historico_anual_numero_cirurgioes_dentistas_radiologistas_SUS - denstista_radio_profissinoais.csv".into(),
      profissionais_tecnicos:  "dirty_data_historico_anual_numero_auxiliares_e_tecnicos_em_radiologia_SUS.csv".into(),
      wave:                    "dirty_data_dataset_usabilidade_dataSUS_WAVE.csv".into(),
    }
  }
}

impl EtlConfig {
  /// Load from `file` (if given and present) and the environment.
  pub fn load(file: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(file) = file {
      builder = builder.add_source(config::File::from(file).required(false));
    }
    let settings = builder
      .add_source(
        config::Environment::with_prefix("PAINEL")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  /// Path of a data file.
  pub fn data_file(&self, name: &str) -> PathBuf { self.data_dir.join(name) }

  /// Dialect for an input slot: the configured override, else `default`.
  ///
  /// An override never drops the columns `default` requires.
  pub fn dialect(&self, slot: &str, default: Dialect) -> Dialect {
    let Some(custom) = self.dialects.get(slot) else {
      return default;
    };
    let mut dialect = custom.clone();
    for column in default.required_columns {
      if !dialect.required_columns.contains(&column) {
        dialect.required_columns.push(column);
      }
    }
    dialect
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("painel.toml");
    std::fs::write(
      &path,
      r#"
data_dir = "/srv/dados"
population_year = 2024

[files]
wave = "wave.csv"

[dialects.wave]
separator = ";"
header_row_offset = 1
"#,
    )
    .unwrap();

    let cfg = EtlConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(cfg.data_dir, PathBuf::from("/srv/dados"));
    assert_eq!(cfg.population_year, 2024);
    assert_eq!(cfg.equipment_year, 2025);
    assert_eq!(cfg.files.wave, "wave.csv");
    assert_eq!(cfg.files.exames, FileNames::default().exames);

    let wave = cfg.dialect("wave", Dialect::default());
    assert_eq!(wave.separator, ';');
    assert_eq!(wave.header_row_offset, 1);
    assert_eq!(cfg.dialect("exames", Dialect::default()).separator, ',');
  }

  #[test]
  fn overrides_keep_required_columns() {
    let mut cfg = EtlConfig::default();
    cfg.dialects.insert(
      "populacao".to_owned(),
      Dialect::default().separator(',').require(&["Local", "Extra"]),
    );

    let default = Dialect::default().separator(';').require(&["Local", "Total"]);
    let dialect = cfg.dialect("populacao", default);
    assert_eq!(dialect.separator, ',');
    assert_eq!(dialect.required_columns, vec!["Local", "Extra", "Total"]);
  }

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let cfg = EtlConfig::load(Some(Path::new("/nonexistent/painel.toml"))).unwrap();
    assert_eq!(cfg.database, PathBuf::from("painel.db"));
    assert_eq!(cfg.wave_collection_date, NaiveDate::from_ymd_opt(2025, 11, 16).unwrap());
  }
}
