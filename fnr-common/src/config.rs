//! Configuration loading and run settings resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 arrive merged in [`ConfigOverrides`] (clap reads both).

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// GraphQL endpoint of the ranking service
pub const DEFAULT_ENDPOINT: &str = "https://badvlasim.westeurope.cloudapp.azure.com/api/v1/graphql";

/// Distinct member ids per remote query
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Timeout for a single ranking query
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default tracing level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub endpoint: Option<String>,
}

/// On-disk TOML configuration
///
/// ```toml
/// log_level = "debug"
///
/// [download-ranking]
/// input = "/data/members.csv"
/// output = "/data/members-ranked.csv"
/// batch_size = 50
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default, rename = "download-ranking")]
    pub download_ranking: DownloadRankingSection,
}

/// `[download-ranking]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DownloadRankingSection {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub batch_size: usize,
    pub endpoint: String,
    pub timeout: Duration,
}

impl TomlConfig {
    /// Effective log level (falls back to [`DEFAULT_LOG_LEVEL`])
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_io(path, e))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Platform config file location (`<config dir>/fnr/config.toml`), if present
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("fnr").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load the TOML config named on the command line, else the platform default.
///
/// An explicitly named file must exist; a missing platform default is not an error.
pub fn load_optional_config(explicit: Option<&Path>) -> Result<Option<TomlConfig>> {
    match explicit {
        Some(path) => load_toml_config(path).map(Some),
        None => match default_config_path() {
            Some(path) => {
                debug!(path = %path.display(), "Loading default config file");
                load_toml_config(&path).map(Some)
            }
            None => Ok(None),
        },
    }
}

/// Merge overrides, file settings and defaults into validated run settings
pub fn resolve_run_config(
    overrides: &ConfigOverrides,
    file: Option<&TomlConfig>,
) -> Result<RunConfig> {
    let section = file.map(|c| &c.download_ranking);

    let input = overrides
        .input
        .clone()
        .or_else(|| section.and_then(|s| s.input.clone()))
        .ok_or_else(|| Error::Config("input file path is required".to_string()))?;

    let output = overrides
        .output
        .clone()
        .or_else(|| section.and_then(|s| s.output.clone()))
        .ok_or_else(|| Error::Config("output file path is required".to_string()))?;

    if !input.is_file() {
        return Err(Error::Config(format!(
            "input file {} does not exist or is not a file",
            input.display()
        )));
    }

    let batch_size = overrides
        .batch_size
        .or_else(|| section.and_then(|s| s.batch_size))
        .unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
        return Err(Error::Config("batch_size must be at least 1".to_string()));
    }

    let endpoint = overrides
        .endpoint
        .clone()
        .or_else(|| section.and_then(|s| s.endpoint.clone()))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let timeout_secs = section
        .and_then(|s| s.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(RunConfig {
        input,
        output,
        batch_size,
        endpoint,
        timeout: Duration::from_secs(timeout_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_download_ranking_table() {
        let config: TomlConfig = toml::from_str(
            r#"
            log_level = "debug"

            [download-ranking]
            input = "in.csv"
            output = "out.csv"
            batch_size = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.download_ranking.input, Some(PathBuf::from("in.csv")));
        assert_eq!(config.download_ranking.output, Some(PathBuf::from("out.csv")));
        assert_eq!(config.download_ranking.batch_size, Some(10));
        assert!(config.download_ranking.endpoint.is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.log_level(), DEFAULT_LOG_LEVEL);
        assert!(config.download_ranking.input.is_none());
    }

    #[test]
    fn test_missing_input_is_config_error() {
        let overrides = ConfigOverrides {
            output: Some(PathBuf::from("out.csv")),
            ..Default::default()
        };
        let err = resolve_run_config(&overrides, None).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("input")));
    }
}
