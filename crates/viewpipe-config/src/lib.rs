//! viewpipe configuration.
//!
//! TOML-based configuration for the launcher, native diagnostics and the
//! initial window settings. All sections use defaults so partial configs
//! work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use viewpipe_config::{config_to_json, load_config};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{DiagnosticsConfig, LauncherConfig, StderrLevel, ViewpipeConfig, WindowDefaults};
pub use toml_loader::{apply_env_overrides, load_from_path};

use std::path::Path;

use viewpipe_common::ConfigError;

/// Load config from the platform default path and apply environment overrides.
pub fn load_config() -> Result<ViewpipeConfig, ConfigError> {
    let mut config = toml_loader::load_default()?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Load config from an explicit path and apply environment overrides.
pub fn load_config_from(path: &Path) -> Result<ViewpipeConfig, ConfigError> {
    let mut config = load_from_path(path)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &ViewpipeConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
