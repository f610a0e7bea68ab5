//! Configuration schema types for viewpipe.
//!
//! All structs use `serde(default)` so partial configs work correctly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use viewpipe_common::SizeHint;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewpipeConfig {
    pub launcher: LauncherConfig,
    pub diagnostics: DiagnosticsConfig,
    pub window: WindowDefaults,
}

/// Where to find the native window binaries.
///
/// The executable for a target is `<binary_dir>/<binary_prefix>-<target>`,
/// e.g. `viewpipe-x86_64-linux`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LauncherConfig {
    /// Directory holding the binaries. Defaults to the directory of the
    /// running executable.
    pub binary_dir: Option<PathBuf>,
    pub binary_prefix: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            binary_dir: None,
            binary_prefix: "viewpipe".to_string(),
        }
    }
}

/// Level at which native stderr lines are logged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StderrLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
}

/// Handling of the native process's stderr.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Forward stderr lines to the log. When false they are drained and dropped.
    pub forward_stderr: bool,
    pub stderr_level: StderrLevel,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            forward_stderr: true,
            stderr_level: StderrLevel::Debug,
        }
    }
}

/// Initial window settings applied by the CLI once a window is ready.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowDefaults {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub size_hint: SizeHint,
    /// Page to open on startup.
    pub url: Option<String>,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            title: "viewpipe".to_string(),
            width: 800,
            height: 600,
            size_hint: SizeHint::None,
            url: None,
        }
    }
}
