//! TOML config file loading.

mod loader;
mod paths;


pub use loader::{apply_env_overrides, load_default, load_from_path, BINARY_DIR_ENV};
pub use paths::default_config_path;
