use std::path::PathBuf;

use crate::types::WindowState;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures raised by a window controller and its protocol channel.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    /// No native binary exists for this architecture/OS pair. Raised before spawn.
    #[error("unsupported platform: {arch}-{os}")]
    UnsupportedPlatform { arch: String, os: String },

    /// The requested option cannot be honored on this platform.
    #[error("unsupported option: {0}")]
    UnsupportedOption(String),

    /// A write was attempted after the native process went away.
    #[error("native process has terminated")]
    ProcessTerminated,

    /// An inbound line could not be decoded into an envelope.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A `bindCallback` referenced an id that was never bound.
    #[error("no binding registered for id {0}")]
    UnknownBinding(u32),

    /// The window is not in a state that accepts this operation.
    #[error("cannot {operation} while window is {state}")]
    InvalidState {
        operation: &'static str,
        state: WindowState,
    },

    #[error("failed to spawn {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ViewpipeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
