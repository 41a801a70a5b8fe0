//! finsync - Main entry point
//!
//! Runs one synchronization pass: extract recent contract payment rows from
//! the source ledger, classify and group them, reconcile each contract
//! against the target entry store, and deliver financial upserts through
//! the gateway.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use finsync_core::{Classifier, SyncPipeline};
use finsync_domain::{Config, ExtractionFilter};
use finsync_infra::config::loader;
use finsync_infra::database::{ENTRIES_SCHEMA_SQL, LEDGER_SCHEMA_SQL};
use finsync_infra::{
    CredentialCache, GatewayClient, HttpClient, SqliteEntryDirectory, SqliteLedgerRepository,
    StoreManager,
};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line arguments for finsync
#[derive(Parser, Debug)]
#[command(name = "finsync")]
#[command(about = "Contract installment synchronization pipeline")]
#[command(version)]
struct Args {
    /// Path to a config file (otherwise environment variables and probed
    /// config files are used)
    #[arg(short, long, env = "FINSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Override the extraction window in days back from today
    #[arg(long, conflicts_with = "contracts")]
    window_days: Option<u32>,

    /// Synchronize an explicit list of contract identifiers instead of a
    /// date window
    #[arg(long, value_delimiter = ',')]
    contracts: Option<Vec<i64>>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finsync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "synchronization run aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => loader::load_from_file(Some(path.clone())),
        None => loader::load(),
    }
    .context("failed to load configuration")?;

    let filter = extraction_filter(&args, &config);
    info!(?filter, "starting synchronization run");

    let pipeline = build_pipeline(&config).context("failed to assemble pipeline")?;
    let tally = pipeline.run(filter).await.context("synchronization run failed")?;

    info!(
        attempted = tally.attempted,
        succeeded = tally.succeeded,
        failed = tally.failed,
        "synchronization finished"
    );
    Ok(())
}

fn extraction_filter(args: &Args, config: &Config) -> ExtractionFilter {
    match &args.contracts {
        Some(ids) if !ids.is_empty() => ExtractionFilter::Contracts(ids.clone()),
        _ => ExtractionFilter::Window {
            days_back: args.window_days.unwrap_or(config.extraction.window_days),
        },
    }
}

fn build_pipeline(config: &Config) -> Result<SyncPipeline> {
    let source = Arc::new(StoreManager::open(&config.source)?);
    source.run_migrations(LEDGER_SCHEMA_SQL)?;
    let target = Arc::new(StoreManager::open(&config.target)?);
    target.run_migrations(ENTRIES_SCHEMA_SQL)?;

    let http = HttpClient::builder()
        .timeout(Duration::from_secs(config.gateway.timeout_secs))
        .build()
        .context("failed to build http client")?;

    let tokens = Arc::new(CredentialCache::new(&config.gateway, http.clone()));
    let gateway = Arc::new(GatewayClient::new(&config.gateway, http, tokens));

    Ok(SyncPipeline::new(
        Arc::new(SqliteLedgerRepository::new(source)),
        Classifier::default(),
        config.extraction.chunk_size,
        Arc::new(SqliteEntryDirectory::new(target)),
        gateway,
    ))
}
