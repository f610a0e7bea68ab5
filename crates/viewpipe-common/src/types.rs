use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the native window treats the dimensions passed to `setSize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeHint {
    /// Width and height are the default size.
    #[default]
    None = 0,
    /// Width and height are minimum bounds.
    Min = 1,
    /// Width and height are maximum bounds.
    Max = 2,
    /// The user cannot resize the window.
    Fixed = 3,
}

impl SizeHint {
    /// Numeric code carried on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// `Min` and `Max` constrain the window rather than set it.
    pub fn is_bound(self) -> bool {
        matches!(self, SizeHint::Min | SizeHint::Max)
    }
}

impl fmt::Display for SizeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SizeHint::None => "none",
            SizeHint::Min => "min",
            SizeHint::Max => "max",
            SizeHint::Fixed => "fixed",
        };
        f.write_str(s)
    }
}

impl FromStr for SizeHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "0" => Ok(SizeHint::None),
            "min" | "1" => Ok(SizeHint::Min),
            "max" | "2" => Ok(SizeHint::Max),
            "fixed" | "3" => Ok(SizeHint::Fixed),
            other => Err(format!(
                "unknown size hint '{other}' (expected none, min, max or fixed)"
            )),
        }
    }
}

/// Lifecycle of a window controller. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    /// Process spawned, waiting for the native side to report `ready`.
    Created,
    /// Native side accepts mutating commands.
    Ready,
    /// Process terminated. Terminal.
    Destroyed,
}

impl fmt::Display for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WindowState::Created => "created",
            WindowState::Ready => "ready",
            WindowState::Destroyed => "destroyed",
        };
        f.write_str(s)
    }
}
