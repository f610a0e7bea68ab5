//! Configuration validation.
//!
//! Collects every problem into a single `ConfigError` instead of stopping
//! at the first one.

use viewpipe_common::ConfigError;

use crate::schema::ViewpipeConfig;

/// Largest width or height accepted for a window, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ViewpipeConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_launcher(&mut errors, config);
    validate_window(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_launcher(errors: &mut Vec<String>, config: &ViewpipeConfig) {
    let prefix = &config.launcher.binary_prefix;
    if prefix.is_empty() {
        errors.push("launcher.binary_prefix must not be empty".into());
    } else if prefix.contains(['/', '\\']) {
        errors.push(format!(
            "launcher.binary_prefix = {prefix:?} must be a file name, not a path"
        ));
    }
}

fn validate_window(errors: &mut Vec<String>, config: &ViewpipeConfig) {
    validate_range(errors, "window.width", config.window.width, 1, MAX_DIMENSION);
    validate_range(errors, "window.height", config.window.height, 1, MAX_DIMENSION);
    if let Some(url) = &config.window.url {
        if url.trim().is_empty() {
            errors.push("window.url must not be blank".into());
        }
    }
}

/// Push an error if `value` is outside `[min, max]`.
fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(validate(&ViewpipeConfig::default()).is_ok());
    }

    #[test]
    fn catches_zero_height() {
        let mut config = ViewpipeConfig::default();
        config.window.height = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("window.height"));
    }

    #[test]
    fn catches_oversized_width() {
        let mut config = ViewpipeConfig::default();
        config.window.width = MAX_DIMENSION + 1;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("window.width"));
    }

    #[test]
    fn catches_path_in_binary_prefix() {
        let mut config = ViewpipeConfig::default();
        config.launcher.binary_prefix = "../bin/viewpipe".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("launcher.binary_prefix"));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = ViewpipeConfig::default();
        config.launcher.binary_prefix = String::new();
        config.window.width = 0;
        config.window.url = Some("   ".into());
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("launcher.binary_prefix"));
        assert!(err.contains("window.width"));
        assert!(err.contains("window.url"));
        assert_eq!(err.matches("; ").count(), 2);
    }
}
