//! Wire protocol between a controller and its native window process.
//!
//! Both directions carry one JSON object per line:
//! - **host -> native**: `{"type": T, "data": D}` where `D` is always a string.
//! - **native -> host**: an envelope tagged by `type`; see [`Envelope`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use viewpipe_common::{SizeHint, WindowError};

/// A command sent to the native process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Install a page-global trampoline named `name` that calls back with `id`.
    Bind { id: u32, name: String },
    SetTitle(String),
    SetSize {
        width: u32,
        height: u32,
        hint: SizeHint,
    },
    Navigate(String),
    Eval(String),
    /// Script run before every subsequent page load.
    Init(String),
}

#[derive(Serialize)]
struct WireCommand<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: &'a str,
}

impl Command {
    /// Value of the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Bind { .. } => "bind",
            Command::SetTitle(_) => "setTitle",
            Command::SetSize { .. } => "setSize",
            Command::Navigate(_) => "navigate",
            Command::Eval(_) => "eval",
            Command::Init(_) => "init",
        }
    }

    /// Value of the `data` field, flattened to a string.
    pub fn data(&self) -> String {
        match self {
            Command::Bind { id, name } => format!("{id}:{name}"),
            Command::SetSize {
                width,
                height,
                hint,
            } => format!("{width}:{height}:{}", hint.code()),
            Command::SetTitle(s) | Command::Navigate(s) | Command::Eval(s) | Command::Init(s) => {
                s.clone()
            }
        }
    }

    /// Serialize to a single newline-terminated JSON line.
    pub fn to_line(&self) -> Result<String, WindowError> {
        let data = self.data();
        let mut line = serde_json::to_string(&WireCommand {
            kind: self.kind(),
            data: &data,
        })
        .map_err(|e| WindowError::Protocol(format!("failed to encode {}: {e}", self.kind())))?;
        line.push('\n');
        Ok(line)
    }
}

/// Name and optional payload of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Native window lifecycle event (`ready`, `close`, ...).
    Event(EventPayload),
    /// Event relayed from script running inside the page (`navigate`, `load`, ...).
    InternalEvent(EventPayload),
    /// A bound function was called from the page.
    BindCallback { id: u32, args: Vec<Value> },
}

/// The native side double-encodes `event` payloads as a JSON string.
/// An inline object is accepted as well.
#[derive(Deserialize)]
#[serde(untagged)]
enum NativeEventData {
    Encoded(String),
    Inline(EventPayload),
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawEnvelope {
    #[serde(rename = "event")]
    Event { data: NativeEventData },
    #[serde(rename = "internalEvent")]
    InternalEvent { data: EventPayload },
    #[serde(rename = "bindCallback")]
    BindCallback {
        id: u32,
        #[serde(default)]
        data: Vec<Value>,
    },
}

impl Envelope {
    /// Decode one line (without its terminator).
    ///
    /// Malformed JSON, a missing or unknown `type`, or a payload of the wrong
    /// shape all produce [`WindowError::Protocol`].
    pub fn decode(line: &str) -> Result<Self, WindowError> {
        let raw: RawEnvelope = serde_json::from_str(line)
            .map_err(|e| WindowError::Protocol(format!("{e}: {}", preview(line))))?;

        Ok(match raw {
            RawEnvelope::Event { data } => {
                let payload = match data {
                    NativeEventData::Encoded(s) => serde_json::from_str(&s).map_err(|e| {
                        WindowError::Protocol(format!("bad event payload {}: {e}", preview(&s)))
                    })?,
                    NativeEventData::Inline(payload) => payload,
                };
                Envelope::Event(payload)
            }
            RawEnvelope::InternalEvent { data } => Envelope::InternalEvent(data),
            RawEnvelope::BindCallback { id, data } => Envelope::BindCallback { id, args: data },
        })
    }
}

/// Truncate a line for error messages.
fn preview(line: &str) -> String {
    const MAX: usize = 120;
    if line.len() <= MAX {
        return line.to_string();
    }
    let mut end = MAX;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &line[..end])
}
