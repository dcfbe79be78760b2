//! Command-line arguments

use clap::Parser;
use fnr_common::config::ConfigOverrides;
use std::path::PathBuf;

/// Command-line arguments for fnr-updater
#[derive(Parser, Debug)]
#[command(name = "fnr-updater")]
#[command(about = "Append the latest badminton ranking levels to a member CSV file")]
#[command(version)]
pub struct Args {
    /// Member CSV file to read
    #[arg(short, long, env = "FNR_INPUT")]
    pub input: Option<PathBuf>,

    /// CSV file to write (created or truncated)
    #[arg(short, long, env = "FNR_OUTPUT")]
    pub output: Option<PathBuf>,

    /// TOML config file (defaults to <config dir>/fnr/config.toml when present)
    #[arg(short, long, env = "FNR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Distinct member ids per ranking query
    #[arg(short, long, env = "FNR_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Ranking service GraphQL endpoint
    #[arg(long, env = "FNR_ENDPOINT")]
    pub endpoint: Option<String>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input: self.input.clone(),
            output: self.output.clone(),
            batch_size: self.batch_size,
            endpoint: self.endpoint.clone(),
        }
    }
}
