//! User configuration loading for edit-suggest.
//!
//! This module handles loading user-wide configuration from the XDG config directory.
//! User config location: $XDG_CONFIG_HOME/edit-suggest/edit-suggest.toml
//! Fallback: the platform config directory (e.g. ~/.config/edit-suggest/edit-suggest.toml)

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::Settings;

const APP_DIR: &str = "edit-suggest";
const CONFIG_FILE: &str = "edit-suggest.toml";

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

pub type UserConfigResult<T> = Result<T, UserConfigError>;

/// Returns the path to the user configuration file.
///
/// The path is determined by:
/// 1. If $XDG_CONFIG_HOME is set: $XDG_CONFIG_HOME/edit-suggest/edit-suggest.toml
/// 2. Otherwise: the platform config directory reported by `dirs`
///
/// Returns None if no config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return Some(PathBuf::from(xdg_config).join(APP_DIR).join(CONFIG_FILE));
    }

    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load settings from an explicit file
pub fn load_settings(path: &Path) -> UserConfigResult<Settings> {
    let source = std::fs::read_to_string(path).map_err(|source| UserConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Settings::from_toml_str(&source).map_err(|err| UserConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Load the user-wide settings file.
///
/// Returns Ok(None) when no user config exists.
pub fn load_user_config() -> UserConfigResult<Option<Settings>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        log::debug!("No user config at {}", path.display());
        return Ok(None);
    }
    log::info!("Loading user config from {}", path.display());
    load_settings(&path).map(Some)
}
