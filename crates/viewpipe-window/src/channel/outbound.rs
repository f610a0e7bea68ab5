//! Outbound command path.
//!
//! Delivery is at-most-once and unacknowledged: a queued line is written
//! once, never retried, and the native side sends no receipt.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use viewpipe_common::{WindowError, WindowId};

use crate::protocol::Command;

/// Queue handle for the writer task. Cloning shares the same FIFO.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<String>,
}

impl CommandSender {
    /// Encode and queue a command.
    ///
    /// Fails with [`WindowError::ProcessTerminated`] once the writer task has
    /// stopped, which happens when a write to stdin fails.
    pub fn send(&self, command: &Command) -> Result<(), WindowError> {
        let line = command.to_line()?;
        self.tx
            .send(line)
            .map_err(|_| WindowError::ProcessTerminated)
    }

    /// Whether the writer task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Start the writer task that owns `stdin`.
///
/// The task ends when every [`CommandSender`] is dropped or a write fails.
pub fn spawn_writer<W>(stdin: W, window: WindowId) -> (CommandSender, JoinHandle<()>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(writer_loop(stdin, rx, window));
    (CommandSender { tx }, handle)
}

async fn writer_loop<W: AsyncWrite + Unpin>(
    mut stdin: W,
    mut rx: mpsc::UnboundedReceiver<String>,
    window: WindowId,
) {
    while let Some(line) = rx.recv().await {
        trace!(window = %window.short(), line = line.trim_end(), "-> native");
        let result = match stdin.write_all(line.as_bytes()).await {
            Ok(()) => stdin.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(window = %window.short(), error = %e, "native stdin closed, dropping further commands");
            return;
        }
    }
    debug!(window = %window.short(), "command writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};

    #[tokio::test]
    async fn writes_commands_in_order() {
        let (host, native) = tokio::io::duplex(1024);
        let (sender, _task) = spawn_writer(host, WindowId::new());

        sender.send(&Command::SetTitle("one".into())).unwrap();
        sender.send(&Command::Navigate("two".into())).unwrap();
        sender.send(&Command::Eval("three".into())).unwrap();

        let mut lines = BufReader::new(native).lines();
        assert_eq!(
            lines.next_line().await.unwrap().unwrap(),
            r#"{"type":"setTitle","data":"one"}"#
        );
        assert_eq!(
            lines.next_line().await.unwrap().unwrap(),
            r#"{"type":"navigate","data":"two"}"#
        );
        assert_eq!(
            lines.next_line().await.unwrap().unwrap(),
            r#"{"type":"eval","data":"three"}"#
        );
    }

    #[tokio::test]
    async fn send_after_stdin_closed_is_process_terminated() {
        let (host, native) = tokio::io::duplex(64);
        drop(native);
        let (sender, task) = spawn_writer(host, WindowId::new());

        // The first write hits the broken pipe and stops the writer.
        sender.send(&Command::Navigate("http://x".into())).unwrap();
        task.await.unwrap();

        assert!(sender.is_closed());
        let err = sender.send(&Command::Navigate("http://y".into())).unwrap_err();
        assert!(matches!(err, WindowError::ProcessTerminated));
    }

    #[tokio::test]
    async fn writer_stops_when_senders_dropped() {
        let (host, _native) = tokio::io::duplex(64);
        let (sender, task) = spawn_writer(host, WindowId::new());
        drop(sender);
        task.await.unwrap();
    }
}
