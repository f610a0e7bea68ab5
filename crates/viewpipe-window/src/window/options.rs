use viewpipe_config::{DiagnosticsConfig, LauncherConfig, ViewpipeConfig};

/// Settings used when spawning a window.
#[derive(Debug, Clone, Default)]
pub struct WindowOptions {
    pub launcher: LauncherConfig,
    pub diagnostics: DiagnosticsConfig,
}

impl WindowOptions {
    /// Forward native stderr at `info` instead of the configured level.
    pub fn verbose(mut self) -> Self {
        self.diagnostics.forward_stderr = true;
        self.diagnostics.stderr_level = viewpipe_config::StderrLevel::Info;
        self
    }
}

impl From<&ViewpipeConfig> for WindowOptions {
    fn from(config: &ViewpipeConfig) -> Self {
        Self {
            launcher: config.launcher.clone(),
            diagnostics: config.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use viewpipe_config::StderrLevel;

    #[test]
    fn built_from_config() {
        let mut config = ViewpipeConfig::default();
        config.launcher.binary_dir = Some(PathBuf::from("/opt/viewpipe"));
        config.diagnostics.forward_stderr = false;

        let options = WindowOptions::from(&config);
        assert_eq!(options.launcher.binary_dir, Some(PathBuf::from("/opt/viewpipe")));
        assert!(!options.diagnostics.forward_stderr);
    }

    #[test]
    fn verbose_forwards_stderr_at_info() {
        let options = WindowOptions {
            diagnostics: DiagnosticsConfig {
                forward_stderr: false,
                stderr_level: StderrLevel::Trace,
            },
            ..Default::default()
        }
        .verbose();
        assert!(options.diagnostics.forward_stderr);
        assert_eq!(options.diagnostics.stderr_level, StderrLevel::Info);
    }
}
