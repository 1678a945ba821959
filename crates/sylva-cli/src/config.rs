//! Explorer configuration files.
//!
//! Lookup order: an explicit `--config` path, then `.sylva/config.json` in
//! the working directory, then `sylva/config.json` under the user config
//! directory, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use sylva_graph::ExplorerConfig;
use thiserror::Error;
use tracing::debug;

/// Directory `sylva init` creates.
pub const CONFIG_DIR: &str = ".sylva";

/// Config file name inside any config directory.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The per-user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sylva").join(CONFIG_FILE))
}

/// Loads the configuration for a run from `base`.
pub fn load(explicit: Option<&Path>, base: &Path) -> Result<ExplorerConfig, ConfigError> {
    match locate(explicit, base, user_config_path()) {
        Some(path) => read(&path),
        None => {
            debug!("No config file found, using defaults");
            Ok(ExplorerConfig::default())
        }
    }
}

/// Picks the config file to read, without reading it.
///
/// An explicit path is returned even if it does not exist, so that a typo
/// is reported instead of silently ignored.
pub fn locate(explicit: Option<&Path>, base: &Path, user: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = base.join(CONFIG_DIR).join(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    user.filter(|path| path.is_file())
}

/// Reads one config file.
pub fn read(path: &Path) -> Result<ExplorerConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Writes the default configuration under `base`. Returns the file path, or
/// `None` if one already exists.
pub fn write_default(base: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let dir = base.join(CONFIG_DIR);
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        return Ok(None);
    }

    let io_err = |source| ConfigError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(&dir).map_err(io_err)?;

    let text = serde_json::to_string_pretty(&ExplorerConfig::default()).map_err(|source| {
        ConfigError::Parse {
            path: path.clone(),
            source,
        }
    })?;
    fs::write(&path, text).map_err(io_err)?;
    Ok(Some(path))
}
