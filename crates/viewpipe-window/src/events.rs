//! Well-known event names and typed page-event payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The native layer finished initializing; mutating commands are accepted.
pub const READY: &str = "ready";
/// The window closed, natively or through `destroy()`. Emitted exactly once.
pub const CLOSE: &str = "close";
/// The page location changed. Fired before the new page has loaded.
pub const NAVIGATE: &str = "navigate";
/// The page finished loading.
pub const LOAD: &str = "load";

/// Events that drive the window lifecycle. Only the native layer may send them.
pub fn is_lifecycle(name: &str) -> bool {
    name == READY || name == CLOSE
}

/// Payload of the `navigate` and `load` events reported by the page bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEvent {
    pub url: String,
}

impl PageEvent {
    /// Decode a listener payload. Returns `None` for missing or foreign shapes.
    pub fn from_payload(payload: Option<&Value>) -> Option<Self> {
        payload.and_then(|v| PageEvent::deserialize(v).ok())
    }
}
