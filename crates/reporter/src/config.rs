//! Configuration file support for reporter.
//!
//! Loads `reporter.toml` from the working directory, falling back to
//! `<config dir>/reporter/config.toml`.

use anyhow::{Context, Result};
use reporter_logging::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings loaded from the config file
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReporterConfig {
    /// Directory holding the export files
    pub directory: Option<PathBuf>,
    /// Tracing filter, e.g. "info" or "reporter_export=debug"
    pub log_level: Option<String>,
    /// Log output format
    pub log_format: Option<LogFormat>,
}

/// The config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "reporter.toml";

impl ReporterConfig {
    /// Load configuration, trying the working directory first and then the
    /// user config directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if a file exists and parses successfully
    /// - `Ok(None)` if neither file exists
    /// - `Err(...)` if a file exists but fails to parse
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let local = working_dir.join(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::load_from(&local).map(Some);
        }

        match dirs::config_dir() {
            Some(dir) => {
                let global = dir.join("reporter").join("config.toml");
                if global.exists() {
                    Self::load_from(&global).map(Some)
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: ReporterConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
