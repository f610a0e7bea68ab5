//! The window controller.
//!
//! A [`Window`] owns one native process together with its command writer,
//! its stdout and stderr pumps, an event [`Dispatcher`] and a
//! [`BindingRegistry`]. It enforces the lifecycle
//! `Created -> Ready -> Destroyed`: mutating commands are rejected until the
//! native side reports `ready`, and everything is rejected after the window
//! is destroyed.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;
use viewpipe_common::{SizeHint, WindowError, WindowId, WindowState};

use crate::bindings::BindingRegistry;
use crate::channel::CommandSender;
use crate::dispatcher::{Dispatcher, ListenerId};
use crate::events::{self, PageEvent};
use crate::launcher::{Target, Terminate};
use crate::protocol::Command;

mod lifecycle;
mod options;


pub use lifecycle::CloseCause;
pub use options::WindowOptions;

/// Handle to a native window. Clones share the same window.
///
/// Listener and binding callbacks run on the stdout pump task. They may call
/// back into the window, e.g. to `navigate` from a `ready` listener.
/// A callback that panics takes the pump down with it; the window is then
/// torn down with [`CloseCause::ProcessExited`].
#[derive(Clone)]
pub struct Window {
    inner: Arc<WindowInner>,
}

pub(crate) struct WindowInner {
    id: WindowId,
    target: Target,
    state: watch::Sender<WindowState>,
    commands: CommandSender,
    dispatcher: Dispatcher,
    bindings: BindingRegistry,
    process: Mutex<Option<Box<dyn Terminate>>>,
    close_cause: OnceLock<CloseCause>,
}

impl Window {
    pub fn id(&self) -> &WindowId {
        &self.inner.id
    }

    /// Platform the native binary was resolved for.
    pub fn target(&self) -> Target {
        self.inner.target
    }

    pub fn state(&self) -> WindowState {
        self.inner.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == WindowState::Ready
    }

    pub fn is_destroyed(&self) -> bool {
        self.state() == WindowState::Destroyed
    }

    /// Why the window was torn down, once it has been.
    pub fn close_cause(&self) -> Option<CloseCause> {
        self.inner.close_cause.get().copied()
    }

    /// Listen for events named `event`.
    ///
    /// Native events (`ready`, `close`, ...) and page events (`navigate`,
    /// `load`, ...) share one namespace.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        self.inner.dispatcher.on(event, listener)
    }

    /// Remove a listener. Removing an unknown listener is not an error.
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.dispatcher.off(id)
    }

    /// Listen for page navigations. Fired before the new page loads.
    pub fn on_navigate<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(PageEvent) + Send + Sync + 'static,
    {
        self.on_page_event(events::NAVIGATE, listener)
    }

    /// Listen for completed page loads.
    pub fn on_load<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(PageEvent) + Send + Sync + 'static,
    {
        self.on_page_event(events::LOAD, listener)
    }

    fn on_page_event<F>(&self, name: &'static str, listener: F) -> ListenerId
    where
        F: Fn(PageEvent) + Send + Sync + 'static,
    {
        self.on(name, move |payload| match PageEvent::from_payload(payload) {
            Some(page) => listener(page),
            None => debug!(event = name, ?payload, "page event without url, skipped"),
        })
    }

    /// Wait until the native side reports `ready`.
    ///
    /// Fails with [`WindowError::InvalidState`] if the window is destroyed
    /// first.
    pub async fn ready(&self) -> Result<(), WindowError> {
        let mut rx = self.inner.state.subscribe();
        let state = rx
            .wait_for(|s| *s != WindowState::Created)
            .await
            .map(|s| *s)
            .unwrap_or(WindowState::Destroyed);
        match state {
            WindowState::Ready => Ok(()),
            state => Err(WindowError::InvalidState {
                operation: "wait for ready",
                state,
            }),
        }
    }

    /// Wait until the window is destroyed, for whatever reason.
    pub async fn closed(&self) {
        let mut rx = self.inner.state.subscribe();
        let _ = rx.wait_for(|s| *s == WindowState::Destroyed).await;
    }

    pub fn set_title(&self, title: impl Into<String>) -> Result<(), WindowError> {
        self.send("set title", Command::SetTitle(title.into()))
    }

    /// Resize the window.
    ///
    /// On macOS, [`SizeHint::Min`] and [`SizeHint::Max`] are rejected with
    /// [`WindowError::UnsupportedOption`] and nothing is sent.
    pub fn set_size(&self, width: u32, height: u32, hint: SizeHint) -> Result<(), WindowError> {
        self.inner.require_ready("set size")?;
        if hint.is_bound() && !self.inner.target.supports_bound_size_hints() {
            return Err(WindowError::UnsupportedOption(format!(
                "{} only supports size hints none and fixed, got {hint}",
                self.inner.target
            )));
        }
        self.send(
            "set size",
            Command::SetSize {
                width,
                height,
                hint,
            },
        )
    }

    pub fn navigate(&self, url: impl Into<String>) -> Result<(), WindowError> {
        self.send("navigate", Command::Navigate(url.into()))
    }

    /// Evaluate script in the current page.
    pub fn eval(&self, script: impl Into<String>) -> Result<(), WindowError> {
        self.send("eval", Command::Eval(script.into()))
    }

    /// Register script to run before every subsequent page load.
    ///
    /// The page already loaded is not affected.
    pub fn init(&self, script: impl Into<String>) -> Result<(), WindowError> {
        self.send("init", Command::Init(script.into()))
    }

    /// Expose `callback` to page script as a global function named `name`.
    ///
    /// Returns the binding id. Page-side calls arrive with their arguments as
    /// a positional slice.
    pub fn bind<F>(&self, name: impl Into<String>, callback: F) -> Result<u32, WindowError>
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.inner.require_ready("bind")?;
        self.inner
            .bindings
            .bind(name, callback, &self.inner.commands)
    }

    /// `(id, name)` of every binding, in id order.
    pub fn bindings(&self) -> Vec<(u32, String)> {
        self.inner.bindings.entries()
    }

    /// Terminate the native process and emit `close`.
    ///
    /// Calling this on an already destroyed window does nothing.
    pub fn destroy(&self) {
        self.inner.teardown(CloseCause::Destroyed);
    }

    fn send(&self, operation: &'static str, command: Command) -> Result<(), WindowError> {
        self.inner.require_ready(operation)?;
        debug!(window = %self.inner.id.short(), kind = command.kind(), "command queued");
        self.inner.commands.send(&command)
    }
}

impl WindowInner {
    fn state(&self) -> WindowState {
        *self.state.borrow()
    }

    fn require_ready(&self, operation: &'static str) -> Result<(), WindowError> {
        match self.state() {
            WindowState::Ready => Ok(()),
            WindowState::Destroyed
                if self.close_cause.get() == Some(&CloseCause::ProcessExited) =>
            {
                Err(WindowError::ProcessTerminated)
            }
            state => Err(WindowError::InvalidState { operation, state }),
        }
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.inner.id)
            .field("target", &self.inner.target)
            .field("state", &self.state())
            .finish()
    }
}
