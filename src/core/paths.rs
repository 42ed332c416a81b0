// src/core/paths.rs

//! Configuration file locations.

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILENAME};
use std::path::PathBuf;
use thiserror::Error;

/// Failures while resolving configuration paths.
#[derive(Error, Debug)]
pub enum PathError {
    /// The platform has no config directory for this user.
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    /// `~` or an environment variable could not be expanded.
    #[error("Could not expand path '{path}': {message}")]
    Expansion {
        /// The path as given.
        path: String,
        /// Why expansion failed.
        message: String,
    },
}

/// Returns the devconsole configuration directory (e.g. `~/.config/devconsole`).
/// Unlike most tools, nothing is created here: a missing directory just means
/// defaults are used.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or(PathError::ConfigDirNotFound)
}

/// Path of the default configuration file.
pub fn get_default_config_path() -> Result<PathBuf, PathError> {
    Ok(get_config_dir()?.join(CONFIG_FILENAME))
}

/// Expands `~` and environment variables in a user-supplied path.
pub fn expand_user_path(raw: &str) -> Result<PathBuf, PathError> {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| PathError::Expansion {
            path: raw.to_string(),
            message: e.to_string(),
        })
}
