//! fnr-updater - Member ranking updater
//!
//! Reads the member CSV, fetches rankings in batches and writes the enriched
//! CSV. Any failure aborts the run; output written up to the last completed
//! partition stays on disk.

use anyhow::{Context, Result};
use clap::Parser;
use fnr_common::config::{load_optional_config, resolve_run_config, DEFAULT_LOG_LEVEL};
use fnr_updater::cli::Args;
use fnr_updater::{CsvRankingUpdater, RemoteRankingClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file_config =
        load_optional_config(args.config.as_deref()).context("Failed to load config file")?;
    let log_level = file_config
        .as_ref()
        .map(|c| c.log_level().to_string())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("fnr_updater={log_level},fnr_common={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fnr-updater v{}", env!("CARGO_PKG_VERSION"));

    let config = resolve_run_config(&args.overrides(), file_config.as_ref())
        .context("Invalid configuration")?;
    info!(endpoint = %config.endpoint, "Ranking service");

    let client = RemoteRankingClient::new(config.endpoint.clone(), config.timeout)
        .context("Failed to create HTTP client")?;
    let updater = CsvRankingUpdater::new(client, config.batch_size)?;

    let summary = updater
        .run_files(&config.input, &config.output)
        .await
        .with_context(|| format!("Failed to update {}", config.input.display()))?;

    info!(
        data_lines = summary.data_lines,
        partitions = summary.partitions.len(),
        output = %config.output.display(),
        "Ranking update complete"
    );
    Ok(())
}
