//! # Config Loader
//!
//! Resolves the [`ConsoleConfig`] for a session. An explicit path must exist;
//! otherwise the default location is tried and a missing file silently falls
//! back to defaults.
use crate::{
    constants::MAX_GRAPH_DIMENSION,
    core::paths::{self, PathError},
    models::ConsoleConfig,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Failures while loading the console configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Could not read config file '{path}': {source}")]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or does not match the config model.
    #[error("Failed to parse config file '{path}': {source}")]
    TomlParse {
        /// The file that was parsed; empty for in-memory text.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// A value parsed but is out of range.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue {
        /// The offending key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
    /// The config path could not be resolved.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Loads the configuration.
///
/// With `explicit_path`, that file is read and must exist (`~` and environment
/// variables are expanded). Without it, the default config file is read if it
/// exists, and defaults are returned otherwise.
pub fn load_config(explicit_path: Option<&str>) -> Result<ConsoleConfig, ConfigError> {
    match explicit_path {
        Some(raw) => {
            let path = paths::expand_user_path(raw)?;
            load_config_file(&path)
        }
        None => {
            let path = match paths::get_default_config_path() {
                Ok(path) => path,
                Err(e) => {
                    log::debug!("No config directory ({}); using defaults", e);
                    return Ok(ConsoleConfig::default());
                }
            };
            if path.is_file() {
                load_config_file(&path)
            } else {
                log::debug!("No config file at '{}'; using defaults", path.display());
                Ok(ConsoleConfig::default())
            }
        }
    }
}

/// Reads, parses and validates one TOML config file.
pub fn load_config_file(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    log::debug!("Loading console config from '{}'", path.display());
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content).map_err(|e| match e {
        ConfigError::TomlParse { source, .. } => ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parses and validates TOML text. Missing keys take their default value.
pub fn parse_config(content: &str) -> Result<ConsoleConfig, ConfigError> {
    let config: ConsoleConfig =
        toml::from_str(content).map_err(|source| ConfigError::TomlParse {
            path: PathBuf::new(),
            source,
        })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConsoleConfig) -> Result<(), ConfigError> {
    if config.max_log_lines == 0 {
        return Err(ConfigError::InvalidValue {
            key: "max_log_lines",
            message: "must be at least 1".to_string(),
        });
    }
    if !(config.sample_interval_secs.is_finite() && config.sample_interval_secs > 0.0) {
        return Err(ConfigError::InvalidValue {
            key: "sample_interval_secs",
            message: format!("must be a positive number, got {}", config.sample_interval_secs),
        });
    }
    let dimensions = 2..=MAX_GRAPH_DIMENSION;
    if !dimensions.contains(&config.graph_width) || !dimensions.contains(&config.graph_height) {
        return Err(ConfigError::InvalidValue {
            key: "graph_width/graph_height",
            message: format!(
                "must both be between 2 and {}, got {}x{}",
                MAX_GRAPH_DIMENSION, config.graph_width, config.graph_height
            ),
        });
    }
    if config.toggle_key.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "toggle_key",
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}
