//! painel-etl binary.
//!
//! Reads `painel.toml` (or the path given with `--config`), opens the SQLite
//! store and runs the selected datasets in dependency order.
//!
//! ```text
//! painel-etl run                       # every dataset
//! painel-etl run uf regioes equipamentos
//! painel-etl --json run wave
//! painel-etl datasets                  # list dataset names
//! ```

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use painel_etl::{Dataset, EtlConfig, pipeline};
use painel_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Load public-health extracts into SQLite")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "painel.toml")]
  config: PathBuf,

  /// SQLite database file; overrides the configured one.
  #[arg(long)]
  database: Option<PathBuf>,

  /// Print the run summary as JSON.
  #[arg(long)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load the named datasets, or all of them.
  Run { datasets: Vec<Dataset> },
  /// List the known datasets.
  Datasets,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let requested = match cli.command {
    Command::Datasets => {
      for dataset in Dataset::ALL {
        println!("{:<20} {}", dataset.name(), dataset.description());
      }
      return Ok(ExitCode::SUCCESS);
    }
    Command::Run { datasets } => datasets,
  };

  let mut config = EtlConfig::load(Some(cli.config.as_path()))
    .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
  if let Some(database) = cli.database {
    config.database = database;
  }

  // Keep dependency order whatever order the names were given in.
  let datasets: Vec<Dataset> = Dataset::ALL
    .into_iter()
    .filter(|d| requested.is_empty() || requested.contains(d))
    .collect();

  let store = SqliteStore::open(&config.database)
    .await
    .with_context(|| format!("failed to open store at {}", config.database.display()))?;

  let summary = pipeline::run(&store, &config, &datasets).await;

  store.close().await.context("failed to close store")?;

  if cli.json {
    println!("{}", serde_json::to_string_pretty(&summary)?);
  } else {
    print!("{summary}");
  }

  if summary.failed() {
    tracing::error!(run_id = %summary.run_id, "run finished with failures");
    Ok(ExitCode::FAILURE)
  } else {
    Ok(ExitCode::SUCCESS)
  }
}
