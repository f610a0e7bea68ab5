//! Controller for native webview windows running as subprocesses.
//!
//! Each window is a separate native process driven over its stdio pipes
//! with newline-delimited JSON:
//! - Lifecycle management (spawn, readiness, destroy)
//! - Ordered command writes (title, size, navigation, script)
//! - Event delivery from the native layer and the page
//! - Host functions callable from page script
//!
//! ```rust,no_run
//! use viewpipe_window::{Window, WindowOptions};
//!
//! # async fn run() -> Result<(), viewpipe_common::WindowError> {
//! let window = Window::spawn(&WindowOptions::default())?;
//! window.ready().await?;
//! window.set_title("Hello")?;
//! window.bind("greet", |args| println!("greet called with {args:?}"))?;
//! window.navigate("https://example.com")?;
//! window.closed().await;
//! # Ok(())
//! # }
//! ```

pub mod bindings;
pub mod channel;
pub mod dispatcher;
pub mod events;
pub mod launcher;
pub mod protocol;
pub mod window;

pub use bindings::{BindingCallback, BindingRegistry};
pub use dispatcher::{Dispatcher, Listener, ListenerId};
pub use events::PageEvent;
pub use launcher::{Launcher, NativeProcess, Target, Terminate};
pub use protocol::{Command, Envelope, EventPayload};
pub use window::{CloseCause, Window, WindowOptions};
