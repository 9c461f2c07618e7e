//! Descriptors of the tables the loaders write, matching the SQLite schema.
//!
//! Lookup descriptors carry no descriptive columns; the `*_SEED` variants of
//! the same tables add them for the datasets that populate them.

use painel_core::{
  dimension::Dimension,
  fact::{FactTable, PeriodColumns, WriteMode},
};

// ─── Dimensions ──────────────────────────────────────────────────────────────

/// Federative units, looked up by their two-letter code.
pub const UF: Dimension = Dimension {
  table:         "unidade_da_federacao",
  id_column:     "id_uf",
  name_column:   "sigla",
  key_column:    "chave",
  extra_columns: &[],
};

pub const UF_SEED: Dimension = Dimension { extra_columns: &["nome"], ..UF };

pub const REGIAO: Dimension = Dimension {
  table:         "regiao_administrativa",
  id_column:     "id_ra",
  name_column:   "nome",
  key_column:    "chave",
  extra_columns: &[],
};

pub const REGIAO_SEED: Dimension = Dimension { extra_columns: &["id_uf"], ..REGIAO };

pub const TIPO_EQUIPAMENTO: Dimension = Dimension {
  table:         "tipo_equipamento",
  id_column:     "id_tipo_equipamento",
  name_column:   "nome",
  key_column:    "chave",
  extra_columns: &[],
};

pub const TIPO_EQUIPAMENTO_SEED: Dimension = Dimension {
  extra_columns: &[
    "quantidade_publico",
    "quantidade_privado",
    "quantidade_funcionando_sus",
    "quantidade_parado_sus",
  ],
  ..TIPO_EQUIPAMENTO
};

pub const CATEGORIA: Dimension = Dimension {
  table:         "categoria_profissional",
  id_column:     "id_categoria",
  name_column:   "nome",
  key_column:    "chave",
  extra_columns: &[],
};

pub const TIPO_EXAME: Dimension = Dimension {
  table:         "tipo_exame",
  id_column:     "id_tipo_exame",
  name_column:   "nome",
  key_column:    "chave",
  extra_columns: &[],
};

/// Portal pages, looked up by URL.
pub const PAGINA: Dimension = Dimension {
  table:         "pagina_portal",
  id_column:     "id_pagina",
  name_column:   "url",
  key_column:    "chave",
  extra_columns: &[],
};

pub const PAGINA_SEED: Dimension = Dimension { extra_columns: &["nome", "sistema"], ..PAGINA };

// ─── Facts ───────────────────────────────────────────────────────────────────

pub const ESPERA_EXAME: FactTable = FactTable {
  table:           "espera_exame",
  key_columns:     &["id_uf", "id_tipo_exame"],
  period:          PeriodColumns::Year { year: "ano" },
  measure_columns: &[
    "qtd_tempo_espera_0_10",
    "qtd_tempo_espera_11_20",
    "qtd_tempo_espera_21_30",
    "qtd_tempo_espera_30_mais",
  ],
  mode:            WriteMode::Upsert { conflict: &["id_uf", "id_tipo_exame", "ano"] },
};

pub const EQUIPAMENTO_REGISTRADO: FactTable = FactTable {
  table:           "equipamento_registrado",
  key_columns:     &["id_ra", "id_tipo_equipamento"],
  period:          PeriodColumns::Year { year: "ano" },
  measure_columns: &["quantidade"],
  mode:            WriteMode::Append,
};

pub const EXAME_REALIZADO: FactTable = FactTable {
  table:           "exame_realizado",
  key_columns:     &["id_tipo_exame", "id_uf"],
  period:          PeriodColumns::YearMonth { year: "ano", month: "mes" },
  measure_columns: &["quantidade"],
  mode:            WriteMode::Append,
};

pub const PROFISSIONAL_REGISTRADO: FactTable = FactTable {
  table:           "profissional_registrado",
  key_columns:     &["id_categoria", "id_uf"],
  period:          PeriodColumns::YearMonth { year: "ano", month: "mes" },
  measure_columns: &["quantidade"],
  mode:            WriteMode::Append,
};

pub const POPULACAO: FactTable = FactTable {
  table:           "populacao",
  key_columns:     &["id_ra"],
  period:          PeriodColumns::Year { year: "ano" },
  measure_columns: &[
    "populacao_total",
    "populacao_plano_saude",
    "populacao_sem_plano_saude",
  ],
  mode:            WriteMode::Append,
};

pub const METRICA_WAVE: FactTable = FactTable {
  table:           "metrica_wave",
  key_columns:     &["id_pagina"],
  period:          PeriodColumns::Date { date: "data_coleta" },
  measure_columns: &["errors", "contrast_errors", "alerts", "aim_score"],
  mode:            WriteMode::Append,
};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fact_tables_are_well_formed() {
    for table in [
      ESPERA_EXAME,
      EQUIPAMENTO_REGISTRADO,
      EXAME_REALIZADO,
      PROFISSIONAL_REGISTRADO,
      POPULACAO,
      METRICA_WAVE,
    ] {
      table.validate().unwrap();
    }
  }
}
