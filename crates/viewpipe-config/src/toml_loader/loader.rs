//! Core TOML config loading: read from path or platform default.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use viewpipe_common::ConfigError;

use super::paths::default_config_path;
use crate::schema::ViewpipeConfig;
use crate::validation;

/// Environment variable that overrides `launcher.binary_dir`.
pub const BINARY_DIR_ENV: &str = "VIEWPIPE_BINARY_DIR";

/// Load config from a specific TOML file path.
///
/// Missing fields take their serde defaults. The result is validated.
pub fn load_from_path(path: &Path) -> Result<ViewpipeConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: ViewpipeConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    validation::validate(&config)?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On macOS: `~/Library/Application Support/viewpipe/config.toml`
/// On Linux: `~/.config/viewpipe/config.toml`
///
/// A missing file yields defaults.
pub fn load_default() -> Result<ViewpipeConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, using defaults", path.display());
            Ok(ViewpipeConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Apply environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: &mut ViewpipeConfig) {
    apply_binary_dir_override(config, std::env::var_os(BINARY_DIR_ENV).map(PathBuf::from));
}

pub(super) fn apply_binary_dir_override(config: &mut ViewpipeConfig, dir: Option<PathBuf>) {
    match dir {
        Some(dir) if !dir.as_os_str().is_empty() => {
            info!("{BINARY_DIR_ENV} overrides binary dir: {}", dir.display());
            config.launcher.binary_dir = Some(dir);
        }
        Some(_) => warn!("{BINARY_DIR_ENV} is set but empty, ignoring"),
        None => {}
    }
}
