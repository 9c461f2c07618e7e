//! Accessibility audit of public health portal pages.
//!
//! Pages are seeded from the audit itself, then one metric row per audited
//! link is appended for the configured collection date.

use std::path::{Path, PathBuf};

use painel_core::{
  CanonicalName,
  dimension::{DimensionMode, Member},
  fact::{CandidateRow, Cell},
  period::Period,
  store::LoadStore,
};
use painel_ingest::{CoercionPolicy, Dialect, Record, coerce::parse_score};

use super::read_input;
use crate::{
  Error, Result,
  config::EtlConfig,
  pipeline::{Context, FactLoad, load_candidates, run_files},
  resolver::Resolver,
  summary::DatasetSummary,
  tables::{METRICA_WAVE, PAGINA, PAGINA_SEED},
};

pub const NAME: &str = "wave";

const LINK: &str = "Links";
const COUNTS: [&str; 3] = ["Errors", "Contrast Errors", "Alerts"];
const SCORE: &str = "AIM Score";

/// Query markers that identify the system behind a portal link.
const SYSTEMS: [(&str, &str); 4] =
  [("?cnes", "CNES"), ("?ibge", "IBGE"), ("?pnad", "IPEDF"), ("?siscan", "SISCAN")];

/// Source system of a portal page, `DATASUS` unless the link says otherwise.
pub fn classify_system(url: &str) -> &'static str {
  let lower = url.to_lowercase();
  SYSTEMS
    .iter()
    .find(|(marker, _)| lower.contains(*marker))
    .map_or("DATASUS", |(_, system)| *system)
}

pub(crate) async fn run<S: LoadStore>(ctx: &mut Context<'_, S>) -> DatasetSummary {
  let config = ctx.config;
  let store = ctx.store;
  let resolver = &mut ctx.resolver;

  let inputs = vec![config.data_file(&config.files.wave)];
  run_files(NAME, inputs, async |path: &PathBuf| load_audit(resolver, store, config, path).await)
    .await
}

fn candidate(record: &Record<'_>, period: Period) -> Result<Option<CandidateRow>> {
  let Some(page) = record.get(LINK).and_then(CanonicalName::new) else {
    return Ok(None);
  };
  let mut measures = Vec::with_capacity(COUNTS.len() + 1);
  for column in COUNTS {
    let n = record.count(column, CoercionPolicy::ZeroOnError)?.unwrap_or(0);
    measures.push(Cell::Int(n));
  }
  measures.push(Cell::from(record.get(SCORE).and_then(parse_score)));
  Ok(Some(CandidateRow { names: vec![page], period, measures }))
}

async fn load_audit<S: LoadStore>(
  resolver: &mut Resolver,
  store: &S,
  config: &EtlConfig,
  path: &Path,
) -> Result<DatasetSummary> {
  let dialect = Dialect::default()
    .skip_header_rows(2)
    .require(&[LINK, SCORE])
    .require(COUNTS.as_slice());
  let table = read_input(config, path, NAME, dialect)?;
  let period = Period::date(config.wave_collection_date);

  let mut candidates = Vec::with_capacity(table.len());
  for record in table.records() {
    if let Some(row) = candidate(&record, period)? {
      candidates.push(row);
    }
  }

  let pages: Vec<Member> = candidates
    .iter()
    .map(|c| {
      let url = c.names[0].display();
      Member::with_extras(c.names[0].clone(), vec![
        Cell::Text(url.to_owned()),
        Cell::Text(classify_system(url).to_owned()),
      ])
    })
    .collect();
  let seeded = store.seed(PAGINA_SEED, pages).await.map_err(Error::store)?;
  tracing::info!(file = table.origin(), inserted = seeded.inserted, "seeded portal pages");

  let load = FactLoad::new(METRICA_WAVE).dimension(PAGINA, DimensionMode::Closed);
  let mut summary = load_candidates(resolver, store, &load, candidates).await?;
  summary.rows_read = table.len();
  summary.dimension_inserts += seeded.inserted;
  summary.record_conflicts(PAGINA.table, seeded.conflicts);
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use painel_ingest::parse_table;

  use super::*;

  #[test]
  fn systems_follow_query_markers() {
    assert_eq!(classify_system("https://cnes.datasus.gov.br/pages/x.jsp?CNES=1"), "CNES");
    assert_eq!(classify_system("https://x.gov.br/painel?siscan"), "SISCAN");
    assert_eq!(classify_system("https://x.gov.br/painel?pnad=2022"), "IPEDF");
    assert_eq!(classify_system("https://tabnet.datasus.gov.br/"), "DATASUS");
  }

  #[test]
  fn metrics_floor_counts_and_keep_missing_scores() {
    let text = "WAVE report\nexported 2025-11-16\n\
                Links,Errors,Contrast Errors,Alerts,AIM Score\n\
                https://a.gov.br,3,-1,n/d,7.5\n\
                https://b.gov.br,0,2,1,\n\
                ,1,1,1,1\n";
    let dialect = Dialect::default().skip_header_rows(2);
    let table = parse_table(text, "wave.csv", &dialect).unwrap();
    let day = Period::date(NaiveDate::from_ymd_opt(2025, 11, 16).unwrap());

    let rows: Vec<CandidateRow> = table
      .records()
      .filter_map(|r| candidate(&r, day).unwrap())
      .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].measures, vec![
      Cell::Int(3),
      Cell::Int(0),
      Cell::Int(0),
      Cell::Real(7.5),
    ]);
    assert_eq!(rows[1].measures[3], Cell::Null);
  }
}
