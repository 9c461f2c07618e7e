//! Federative units. Closed everywhere else, so this list is the only way
//! they enter the database.

use std::path::Path;

use painel_core::{CanonicalName, dimension::Member, fact::Cell, store::LoadStore};

use crate::{pipeline::Context, summary::DatasetSummary, tables::UF_SEED};

pub const NAME: &str = "uf";

/// `(nome, sigla)` of the 27 federative units.
pub const UNIDADES: [(&str, &str); 27] = [
  ("Acre", "AC"),
  ("Alagoas", "AL"),
  ("Amapá", "AP"),
  ("Amazonas", "AM"),
  ("Bahia", "BA"),
  ("Ceará", "CE"),
  ("Distrito Federal", "DF"),
  ("Espírito Santo", "ES"),
  ("Goiás", "GO"),
  ("Maranhão", "MA"),
  ("Mato Grosso", "MT"),
  ("Mato Grosso do Sul", "MS"),
  ("Minas Gerais", "MG"),
  ("Pará", "PA"),
  ("Paraíba", "PB"),
  ("Paraná", "PR"),
  ("Pernambuco", "PE"),
  ("Piauí", "PI"),
  ("Rio de Janeiro", "RJ"),
  ("Rio Grande do Norte", "RN"),
  ("Rio Grande do Sul", "RS"),
  ("Rondônia", "RO"),
  ("Roraima", "RR"),
  ("Santa Catarina", "SC"),
  ("São Paulo", "SP"),
  ("Sergipe", "SE"),
  ("Tocantins", "TO"),
];

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let mut summary = DatasetSummary::new(NAME);

  let members: Vec<Member> = UNIDADES
    .iter()
    .filter_map(|(nome, sigla)| {
      let sigla = CanonicalName::new(sigla)?;
      Some(Member::with_extras(sigla, vec![Cell::Text((*nome).to_owned())]))
    })
    .collect();
  summary.rows_read = UNIDADES.len();
  summary.rows_shaped = members.len();

  match ctx.store.seed(UF_SEED, members).await {
    Ok(resolution) => {
      summary.rows_resolved = resolution.keys.len();
      summary.rows_written = resolution.inserted;
      summary.dimension_inserts = resolution.inserted;
      summary.record_conflicts(UF_SEED.table, resolution.conflicts);
      tracing::info!(inserted = resolution.inserted, "seeded federative units");
    }
    Err(err) => summary.record_error(Path::new(UF_SEED.table), err),
  }
  summary
}
