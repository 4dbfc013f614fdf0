//! Subcommands of the `invex` binary.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use invex_core::models::config::InvexConfig;
use tracing::debug;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invex")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else
/// built-in defaults.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<InvexConfig> {
    if let Some(path) = config_path {
        return InvexConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config file {}", path.display());
        return InvexConfig::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e));
    }

    Ok(InvexConfig::default())
}
