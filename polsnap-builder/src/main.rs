//! polsnap-builder - Political snapshot builder
//!
//! Resolves every configured country against the public sources, merges the
//! results with the previous snapshot and writes one JSON document.
//!
//! Exit status is non-zero only for whole-run failures (bad config, HTTP
//! client setup, output write); per-field source failures end up in the
//! snapshot as field statuses.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use polsnap_builder::config::{BuilderConfig, CliOverrides};
use polsnap_builder::fusion::sticky_merge::PreviousSnapshotIndex;
use polsnap_builder::workflow::storage;
use polsnap_builder::{Pipeline, RunContext};

/// Command-line arguments for polsnap-builder
#[derive(Parser, Debug)]
#[command(name = "polsnap-builder")]
#[command(about = "Build the per-country political snapshot")]
#[command(version)]
struct Args {
    /// TOML config file (else POLSNAP_CONFIG, else the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output snapshot path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only build these countries (ISO2 code, catalog name, or Name:XX); repeatable
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Delay between countries in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Reference year for the freedom rating window
    #[arg(long)]
    reference_year: Option<i32>,

    /// Maximum distinct headlines per country
    #[arg(long)]
    news_limit: Option<usize>,

    /// Default log filter when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            output: self.output.clone(),
            countries: self.countries.clone(),
            inter_country_delay_ms: self.delay_ms,
            reference_year: self.reference_year,
            news_limit: self.news_limit,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = BuilderConfig::load(args.config.as_deref(), &args.overrides())
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.toml.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting polsnap-builder v{}", env!("CARGO_PKG_VERSION"));

    let run = RunContext::new(Utc::now().date_naive(), config.toml.run.reference_year);
    let output = config.toml.output_path.clone();
    info!(
        output = %output.display(),
        countries = config.toml.countries.len(),
        reference_year = run.reference_year,
        "Configuration resolved"
    );

    let previous = PreviousSnapshotIndex::new(storage::load_previous(&output));
    let pipeline = Pipeline::from_config(&config).context("Failed to initialize source clients")?;

    let snapshot = pipeline.run(&config.toml.countries, &run, &previous).await;

    storage::write_snapshot(&output, &snapshot)
        .with_context(|| format!("Failed to write snapshot to {}", output.display()))?;

    info!("Done");
    Ok(())
}
