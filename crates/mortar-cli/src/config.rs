//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI owns configuration; the engine only ever sees the resulting
//! delimiters, policy and global values.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (`--strict`, `--lenient`, `--set`), applied by commands
//! 2. `MORTAR_*` environment variables, `__` between sections
//!    (`MORTAR_POLICY__STRICT_VARIABLES=true`)
//! 3. The config file (`--config`, else the user config path)
//! 4. Built-in defaults

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use mortar_core::domain::{Delimiters, ErrorPolicy, Frame};

use crate::error::{CliError, CliResult};

/// File name used by `mortar init --local`.
pub const LOCAL_CONFIG_FILE: &str = "mortar.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub delimiters: Delimiters,
    pub policy: ErrorPolicy,
    /// Persistent values visible to every template.
    pub globals: Frame,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `config_file` must exist. The default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "Loading configuration");

        let defaults = Config::try_from(&Self::default()).map_err(config_error)?;
        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.as_path()).required(required))
            .add_source(
                Environment::with_prefix("MORTAR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error)?;

        config.try_deserialize().map_err(config_error)
    }

    /// Path to the user configuration file.
    ///
    /// Falls back to `mortar.toml` in the current directory when no home
    /// directory can be determined.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "mortar", "mortar")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// TOML rendering used by `init` and `config list`.
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Look up a dotted key such as `delimiters.marker_start`.
    pub fn get(&self, key: &str) -> CliResult<String> {
        let unknown = || CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        };
        let tree = serde_json::to_value(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })?;

        let value = key
            .split('.')
            .try_fold(&tree, |node, segment| node.get(segment))
            .ok_or_else(unknown)?;
        Ok(match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

fn config_error(e: config::ConfigError) -> CliError {
    CliError::ConfigError {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}
