//! Window construction, the stdout pump, and teardown.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tokio::io::AsyncRead;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};
use viewpipe_common::{WindowError, WindowId, WindowState};
use viewpipe_config::DiagnosticsConfig;

use super::options::WindowOptions;
use super::{Window, WindowInner};
use crate::bindings::BindingRegistry;
use crate::channel::{drain_stderr, read_lines, spawn_writer};
use crate::dispatcher::Dispatcher;
use crate::events;
use crate::launcher::{Launcher, NativeProcess, Target};
use crate::protocol::{Envelope, EventPayload};

/// Why a window was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCause {
    /// `Window::destroy` was called.
    Destroyed,
    /// The native side reported `close`.
    NativeClose,
    /// The native process closed its stdout.
    ProcessExited,
}

impl Window {
    /// Spawn the native binary for the running platform.
    ///
    /// Returns as soon as the process is started; the window is `Created`
    /// until the native side reports `ready`. Platform resolution and spawn
    /// failures are returned before any task is started.
    pub fn spawn(options: &WindowOptions) -> Result<Self, WindowError> {
        let launcher = Launcher::new(&options.launcher)?;
        Self::spawn_with(&launcher, options.diagnostics)
    }

    /// Spawn using an explicit launcher.
    pub fn spawn_with(
        launcher: &Launcher,
        diagnostics: DiagnosticsConfig,
    ) -> Result<Self, WindowError> {
        let process = launcher.launch()?;
        Ok(Self::attach(process, launcher.target(), diagnostics))
    }

    /// Take ownership of an already running native process and start its pumps.
    ///
    /// `target` decides platform capability checks such as bound size hints.
    /// Must be called from within a tokio runtime.
    pub fn attach(process: NativeProcess, target: Target, diagnostics: DiagnosticsConfig) -> Self {
        let NativeProcess {
            stdin,
            stdout,
            stderr,
            terminator,
        } = process;

        let id = WindowId::new();
        let pid = terminator.pid();
        let (commands, _writer) = spawn_writer(stdin, id.clone());
        let (state, _) = watch::channel(WindowState::Created);

        let inner = Arc::new(WindowInner {
            id: id.clone(),
            target,
            state,
            commands,
            dispatcher: Dispatcher::new(),
            bindings: BindingRegistry::new(),
            process: Mutex::new(Some(terminator)),
            close_cause: OnceLock::new(),
        });

        info!(window = %id.short(), %target, ?pid, "window created");

        tokio::spawn(drain_stderr(stderr, id, diagnostics));
        tokio::spawn(Arc::clone(&inner).pump_stdout(stdout));

        Self { inner }
    }
}

impl WindowInner {
    /// Decode and route stdout lines until EOF, then tear the window down.
    async fn pump_stdout<R>(self: Arc<Self>, stdout: R)
    where
        R: AsyncRead + Unpin,
    {
        let _exit = PumpExit(self.as_ref());
        let result = read_lines(stdout, |line| {
            trace!(window = %self.id.short(), line, "<- native");
            if let Err(e) = self.handle_line(line) {
                warn!(window = %self.id.short(), error = %e, "inbound message dropped");
            }
        })
        .await;

        match result {
            Ok(lines) => debug!(window = %self.id.short(), lines, "native stdout closed"),
            Err(e) => warn!(window = %self.id.short(), error = %e, "native stdout read failed"),
        }
    }

    /// Route one inbound line.
    ///
    /// Protocol and unknown-binding errors are returned to the caller and
    /// leave the window state untouched. Anything arriving after the window
    /// is destroyed, well-formed or not, is ignored.
    ///
    /// `ready` and `close` drive the lifecycle and are only honored from the
    /// native layer; the page relaying either is a protocol error.
    pub(super) fn handle_line(&self, line: &str) -> Result<(), WindowError> {
        if self.state() == WindowState::Destroyed {
            trace!(window = %self.id.short(), "window destroyed, inbound message ignored");
            return Ok(());
        }

        match Envelope::decode(line)? {
            Envelope::Event(event) => self.handle_native_event(event),
            Envelope::InternalEvent(event) => {
                if events::is_lifecycle(&event.event) {
                    return Err(WindowError::Protocol(format!(
                        "reserved event {:?} relayed from page",
                        event.event
                    )));
                }
                self.dispatcher.emit(&event.event, event.data.as_ref());
            }
            Envelope::BindCallback { id, args } => {
                debug!(window = %self.id.short(), binding_id = id, args = args.len(), "binding called");
                self.bindings.invoke(id, &args)?;
            }
        }
        Ok(())
    }

    fn handle_native_event(&self, event: EventPayload) {
        match event.event.as_str() {
            events::CLOSE => {
                self.teardown(CloseCause::NativeClose);
            }
            events::READY => {
                let became_ready = self.state.send_if_modified(|state| {
                    if *state == WindowState::Created {
                        *state = WindowState::Ready;
                        true
                    } else {
                        false
                    }
                });
                if became_ready {
                    info!(window = %self.id.short(), "window ready");
                    self.dispatcher.emit(events::READY, event.data.as_ref());
                } else {
                    debug!(window = %self.id.short(), "repeated ready ignored");
                }
            }
            name => {
                self.dispatcher.emit(name, event.data.as_ref());
            }
        }
    }

    /// Move to `Destroyed`, kill the process and emit `close`.
    ///
    /// Returns false when the window was already destroyed.
    pub(super) fn teardown(&self, cause: CloseCause) -> bool {
        let transitioned = self.state.send_if_modified(|state| {
            if *state == WindowState::Destroyed {
                false
            } else {
                let _ = self.close_cause.set(cause);
                *state = WindowState::Destroyed;
                true
            }
        });
        if !transitioned {
            return false;
        }

        let process = self
            .process
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut process) = process {
            if let Err(e) = process.terminate() {
                debug!(window = %self.id.short(), error = %e, "terminate failed, process likely gone");
            }
        }

        info!(window = %self.id.short(), ?cause, "window closed");
        self.dispatcher.emit(events::CLOSE, None);

        // Listeners and bindings often hold clones of the window.
        self.dispatcher.clear();
        self.bindings.clear();
        true
    }
}

/// Tears the window down when the stdout pump ends, including when a
/// listener or binding callback panics on the pump task.
struct PumpExit<'a>(&'a WindowInner);

impl Drop for PumpExit<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!(window = %self.0.id.short(), "stdout pump panicked, closing window");
        }
        self.0.teardown(CloseCause::ProcessExited);
    }
}
