//! Pipeline tests against SQLite, with inputs written to temp directories.

use std::path::Path;

use painel_core::{
  CanonicalName,
  dimension::{DimensionMode, Member},
  fact::Cell,
  period::Period,
  store::LoadStore,
};
use painel_ingest::{Dialect, parse_table};
use painel_store_sqlite::SqliteStore;
use tempfile::TempDir;

use crate::{
  Dataset, EtlConfig,
  datasets::{equipamentos, tipos_exame::MAMMOGRAPHY},
  pipeline::{self, load_candidates},
  resolver::Resolver,
  summary::{DatasetSummary, RunSummary},
  tables::{REGIAO_SEED, TIPO_EQUIPAMENTO, TIPO_EXAME, UF},
};

fn name(raw: &str) -> CanonicalName { CanonicalName::new(raw).unwrap() }

fn config_in(dir: &TempDir) -> EtlConfig {
  EtlConfig {
    data_dir: dir.path().to_path_buf(),
    database: dir.path().join("painel.db"),
    ..EtlConfig::default()
  }
}

fn write(dir: &Path, file: &str, text: &str) {
  let path = dir.join(file);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, text).unwrap();
}

fn dataset<'a>(run: &'a RunSummary, name: &str) -> &'a DatasetSummary {
  run.datasets.iter().find(|d| d.dataset == name).unwrap()
}

fn count(db: &Path, sql: &str) -> i64 {
  let conn = rusqlite::Connection::open(db).unwrap();
  conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

// ─── Federative units ────────────────────────────────────────────────────────

#[tokio::test]
async fn federative_units_seed_once() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let config = EtlConfig::default();

  let first = pipeline::run(&store, &config, &[Dataset::Uf]).await;
  let second = pipeline::run(&store, &config, &[Dataset::Uf]).await;

  assert_eq!(dataset(&first, "uf").rows_written, 27);
  assert_eq!(dataset(&second, "uf").rows_written, 0);
  assert!(!first.failed() && !second.failed());
}

// ─── Equipment scenario ──────────────────────────────────────────────────────

/// Seed the DF, one region and the two equipment types used below.
async fn seed_equipment(store: &SqliteStore) {
  pipeline::run(store, &EtlConfig::default(), &[Dataset::Uf]).await;

  let mut resolver = Resolver::new();
  let df = resolver
    .require(store, UF, &name("DF"))
    .await
    .unwrap();
  store
    .seed(REGIAO_SEED, vec![Member::with_extras(name("Ceilândia"), vec![Cell::Int(df)])])
    .await
    .unwrap();
  store
    .resolve(
      TIPO_EQUIPAMENTO,
      vec![Member::new(name("Tomógrafo Computadorizado")), Member::new(name("PET/CT"))],
      DimensionMode::Open,
    )
    .await
    .unwrap();
}

async fn equipment_store() -> SqliteStore {
  let store = SqliteStore::open_in_memory().await.unwrap();
  seed_equipment(&store).await;
  store
}

const EQUIPMENT_COLUMNS: [(&str, &str); 2] = [
  ("qtd_tomografo_computadorizado", "Tomógrafo Computadorizado"),
  ("qtd_pet_ct", "PET/CT"),
];

async fn load_equipment(store: &SqliteStore, text: &str) -> DatasetSummary {
  let table = parse_table(text, "equipamentos.csv", &Dialect::default()).unwrap();
  let shaped = equipamentos::reshaper(&EQUIPMENT_COLUMNS)
    .reshape(&table, |record| {
      Some((vec![CanonicalName::titled(record.get("ra")?)?], Period::year(2025)))
    })
    .unwrap();
  load_candidates(&mut Resolver::new(), store, &equipamentos::fact_load(), shaped.rows)
    .await
    .unwrap()
}

#[tokio::test]
async fn zero_counts_are_not_recorded() {
  let store = equipment_store().await;

  let summary = load_equipment(&store, "ra,qtd_tomografo_computadorizado,qtd_pet_ct\n\
                                         CEILÂNDIA,3,0\n")
    .await;

  assert_eq!(summary.rows_shaped, 1);
  assert_eq!(summary.rows_written, 1);
  assert!(summary.unresolved.is_empty());
}

#[tokio::test]
async fn unknown_regions_are_excluded_and_reported_once() {
  let store = equipment_store().await;

  let summary = load_equipment(&store, "ra,qtd_tomografo_computadorizado,qtd_pet_ct\n\
                                         Atlântida,1,2\n\
                                         Ceilândia,4,1\n")
    .await;

  assert_eq!(summary.rows_shaped, 4);
  assert_eq!(summary.rows_resolved, 2);
  assert_eq!(summary.rows_written, 2);
  assert_eq!(summary.unresolved.len(), 1);
  let missing = summary.unresolved.iter().next().unwrap();
  assert_eq!(missing.dimension, "regiao_administrativa");
  assert_eq!(missing.name, "Atlântida");
  assert_eq!(summary.dimension_inserts, 0);
}

#[tokio::test]
async fn equipment_count_is_stored_against_region_and_type() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("painel.db");
  let store = SqliteStore::open(&db).await.unwrap();
  seed_equipment(&store).await;

  let summary = load_equipment(&store, "ra,qtd_tomografo_computadorizado,qtd_pet_ct\n\
                                         ceilândia,2,0\n")
    .await;
  assert_eq!(summary.rows_written, 1);
  store.close().await.unwrap();

  assert_eq!(count(&db, "SELECT COUNT(*) FROM equipamento_registrado"), 1);
  assert_eq!(
    count(
      &db,
      "SELECT e.quantidade FROM equipamento_registrado e \
       JOIN tipo_equipamento t ON t.id_tipo_equipamento = e.id_tipo_equipamento \
       JOIN regiao_administrativa r ON r.id_ra = e.id_ra \
       WHERE t.chave = 'tomografo computadorizado' AND r.chave = 'ceilandia' AND e.ano = 2025"
    ),
    2
  );
  assert_eq!(
    count(
      &db,
      "SELECT COUNT(*) FROM equipamento_registrado e \
       JOIN tipo_equipamento t ON t.id_tipo_equipamento = e.id_tipo_equipamento \
       WHERE t.nome = 'PET/CT'"
    ),
    0
  );
}

#[tokio::test]
async fn unknown_region_spelled_two_ways_is_reported_once() {
  let store = equipment_store().await;
  let header = "ra,qtd_tomografo_computadorizado,qtd_pet_ct\n";

  let mut total = DatasetSummary::new(equipamentos::NAME);
  total.merge(load_equipment(&store, &format!("{header}Atlântida,1,0\n")).await);
  total.merge(load_equipment(&store, &format!("{header}Atlantida,2,0\n")).await);

  assert_eq!(total.rows_written, 0);
  assert_eq!(total.unresolved.len(), 1);
  assert_eq!(total.unresolved.iter().next().unwrap().name, "Atlântida");
}

#[tokio::test]
async fn equipment_type_respellings_are_reported() {
  let dir = tempfile::tempdir().unwrap();
  let config = config_in(&dir);
  write(
    dir.path(),
    &config.files.tipos_equipamento,
    "codigo,equipamento,existentes,em_uso,existentes_SUS,em_uso_SUS\n\
     1,TOMÓGRAFO COMPUTADORIZADO,10,9,6,4\n\
     2,Mamógrafo,5,5,3,3\n\
     3,MAMÓGRAFO,1,1,1,1\n",
  );

  let store = SqliteStore::open_in_memory().await.unwrap();
  seed_equipment(&store).await;
  let run = pipeline::run(&store, &config, &[Dataset::TiposEquipamento]).await;

  let tipos = dataset(&run, "tipos-equipamento");
  assert!(!run.failed(), "{run}");
  assert_eq!(tipos.dimension_inserts, 1);
  let observed: Vec<&str> = tipos.conflicts.iter().map(|c| c.conflict.observed.as_str()).collect();
  assert_eq!(observed, vec!["MAMÓGRAFO", "TOMÓGRAFO COMPUTADORIZADO"]);
}

// ─── Wait-time batch ─────────────────────────────────────────────────────────

const WAIT_HEADER: &str = "Ano Resultado;0 - 10 dias;11 - 20 dias;21 - 30 dias;> 30 dias\n";

#[tokio::test]
async fn badly_named_file_fails_alone_and_reruns_overwrite() {
  let dir = tempfile::tempdir().unwrap();
  let config = config_in(&dir);
  let espera = dir.path().join(&config.files.espera_dir);

  write(&espera, "mamografia_atendSP.csv", &format!("{WAIT_HEADER}2023;5;3;0;1\n"));
  write(&espera, "mamografia_atendRJ.csv", &format!("{WAIT_HEADER}2023;2;2;2;2\n;9;9;9;9\n"));
  // Sorts between the two valid files.
  write(&espera, "mamografia_atendRJX.csv", &format!("{WAIT_HEADER}2023;1;1;1;1\n"));

  let store = SqliteStore::open(&config.database).await.unwrap();
  store
    .resolve(TIPO_EXAME, vec![Member::new(name(MAMMOGRAPHY))], DimensionMode::Open)
    .await
    .unwrap();

  let run = pipeline::run(&store, &config, &[Dataset::Uf, Dataset::EsperaExames]).await;
  let wait = dataset(&run, "espera-exames");
  assert_eq!(wait.rows_written, 2);
  assert_eq!(wait.file_errors.len(), 1);
  assert!(wait.file_errors[0].file.ends_with("mamografia_atendRJX.csv"));
  assert!(run.failed());
  assert_eq!(
    count(&config.database, "SELECT COUNT(*) FROM espera_exame e \
       JOIN unidade_da_federacao u ON u.id_uf = e.id_uf WHERE u.sigla = 'SP'"),
    1
  );

  write(&espera, "mamografia_atendSP.csv", &format!("{WAIT_HEADER}2023;8;3;0;1\n"));
  let rerun = pipeline::run(&store, &config, &[Dataset::EsperaExames]).await;
  assert_eq!(dataset(&rerun, "espera-exames").rows_written, 2);
  store.close().await.unwrap();

  assert_eq!(count(&config.database, "SELECT COUNT(*) FROM espera_exame"), 2);
  assert_eq!(
    count(
      &config.database,
      "SELECT e.qtd_tempo_espera_0_10 FROM espera_exame e \
       JOIN unidade_da_federacao u ON u.id_uf = e.id_uf WHERE u.sigla = 'SP'"
    ),
    8
  );
}

#[tokio::test]
async fn missing_exam_type_fails_the_dataset() {
  let dir = tempfile::tempdir().unwrap();
  let config = config_in(&dir);
  let espera = dir.path().join(&config.files.espera_dir);
  write(&espera, "mamografia_atendSP.csv", &format!("{WAIT_HEADER}2023;5;3;0;1\n"));

  let store = SqliteStore::open_in_memory().await.unwrap();
  let run = pipeline::run(&store, &config, &[Dataset::Uf, Dataset::EsperaExames]).await;

  let wait = dataset(&run, "espera-exames");
  assert_eq!(wait.rows_written, 0);
  assert_eq!(wait.file_errors.len(), 1);
  assert!(wait.file_errors[0].error.contains(MAMMOGRAPHY));
}

#[tokio::test]
async fn separator_override_still_checks_columns() {
  let dir = tempfile::tempdir().unwrap();
  let mut config = config_in(&dir);
  config.dialects.insert("populacao".to_owned(), Dialect::default().separator(','));
  write(
    dir.path(),
    &config.files.populacao,
    "Local;Total;Sim;Nao\nCeilândia;350000;80000;270000\n",
  );

  let store = SqliteStore::open_in_memory().await.unwrap();
  let run = pipeline::run(&store, &config, &[Dataset::Uf, Dataset::Populacao]).await;

  let populacao = dataset(&run, "populacao");
  assert!(run.failed());
  assert_eq!(populacao.rows_written, 0);
  assert_eq!(populacao.file_errors.len(), 1);
  assert!(populacao.file_errors[0].error.contains("missing required columns"));
}

// ─── Multi-dataset run ───────────────────────────────────────────────────────

#[tokio::test]
async fn regions_population_and_audit() {
  let dir = tempfile::tempdir().unwrap();
  let config = config_in(&dir);
  let data = dir.path();

  write(data, &config.files.regioes_equipamentos, "ra,qtd_pet_ct\nCeilândia,1\nGuará,0\n");
  write(
    data,
    &config.files.regioes_populacao,
    "Tabela 1\nLocal,Total\nCeilândia,350000\nGuara,140000\nTotal,490000\nFonte: PDAD\n",
  );
  write(
    data,
    &config.files.populacao,
    "Local;Total;Sim;Nao\nCEILÂNDIA;350000;80000;270000\nAtlântida;10;1;9\n",
  );
  write(
    data,
    &config.files.wave,
    "WAVE\nrelatorio\nLinks,Errors,Contrast Errors,Alerts,AIM Score\n\
     https://cnes.datasus.gov.br/?cnes,1,2,3,8.1\n\
     https://tabnet.datasus.gov.br,0,-4,0,\n",
  );

  let store = SqliteStore::open(&config.database).await.unwrap();
  let datasets = [Dataset::Uf, Dataset::Regioes, Dataset::Populacao, Dataset::Wave];
  let run = pipeline::run(&store, &config, &datasets).await;
  assert!(!run.failed(), "{run}");

  let regioes = dataset(&run, "regioes");
  assert_eq!(regioes.dimension_inserts, 2);
  assert_eq!(regioes.conflicts.len(), 1);
  let conflict = &regioes.conflicts.iter().next().unwrap().conflict;
  assert_eq!(conflict.canonical, "Guará");
  assert_eq!(conflict.observed, "Guara");

  let populacao = dataset(&run, "populacao");
  assert_eq!(populacao.rows_read, 2);
  assert_eq!(populacao.rows_written, 1);
  assert_eq!(populacao.unresolved.len(), 1);

  let wave = dataset(&run, "wave");
  assert_eq!(wave.rows_written, 2);
  assert_eq!(wave.dimension_inserts, 2);

  let again = pipeline::run(&store, &config, &[Dataset::Wave]).await;
  assert_eq!(dataset(&again, "wave").dimension_inserts, 0);
  store.close().await.unwrap();

  let db = &config.database;
  assert_eq!(count(db, "SELECT COUNT(*) FROM pagina_portal"), 2);
  assert_eq!(count(db, "SELECT COUNT(*) FROM metrica_wave"), 4);
  assert_eq!(count(db, "SELECT COUNT(*) FROM pagina_portal WHERE sistema = 'CNES'"), 1);
  assert_eq!(count(db, "SELECT COUNT(*) FROM metrica_wave WHERE aim_score IS NULL"), 2);
  assert_eq!(count(db, "SELECT MIN(contrast_errors) FROM metrica_wave"), 0);
  assert_eq!(
    count(db, "SELECT populacao_sem_plano_saude FROM populacao"),
    270000
  );
}
