//! Per-user global configuration in the home directory.
//!
//! `~/.delivr/config.json` is the current location. `~/.dota.config` is the
//! legacy flat file, read only when the current file does not exist.

use super::files::Probe;
use super::legacy::convert_legacy;
use super::tree::ConfigTree;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

pub const GLOBAL_CONFIG_DIR: &str = ".delivr";
pub const GLOBAL_CONFIG_FILE: &str = "config.json";
pub const LEGACY_GLOBAL_CONFIG_FILE: &str = ".dota.config";

pub fn global_config_path(home: &Path) -> PathBuf {
    home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE)
}

pub fn legacy_global_config_path(home: &Path) -> PathBuf {
    home.join(LEGACY_GLOBAL_CONFIG_FILE)
}

/// Load the global config. Missing, empty or malformed files contribute nothing.
pub fn load_global_config(home: &Path) -> ConfigTree {
    match Probe::read(&global_config_path(home)) {
        Probe::Missing => Probe::read(&legacy_global_config_path(home))
            .into_tree()
            .map(|legacy| convert_legacy(&legacy))
            .unwrap_or_default(),
        probe => probe.into_tree().unwrap_or_default(),
    }
}

/// Async counterpart of [`load_global_config`].
pub async fn load_global_config_async(home: &Path) -> ConfigTree {
    match Probe::read_async(&global_config_path(home)).await {
        Probe::Missing => Probe::read_async(&legacy_global_config_path(home))
            .await
            .into_tree()
            .map(|legacy| convert_legacy(&legacy))
            .unwrap_or_default(),
        probe => probe.into_tree().unwrap_or_default(),
    }
}

/// Write `config` as the global config file, creating `~/.delivr` if needed.
pub fn save_global_config(home: &Path, config: &ConfigTree) -> Result<PathBuf, ConfigError> {
    let path = global_config_path(home);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Remove the global config file. Returns whether a file was removed.
pub fn clear_global_config(home: &Path) -> Result<bool, ConfigError> {
    let path = global_config_path(home);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ConfigError::Write { path, source }),
    }
}
