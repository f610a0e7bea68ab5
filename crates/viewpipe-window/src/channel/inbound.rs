//! Inbound stream pumps.
//!
//! Reads are never assumed to align with message boundaries: bytes are
//! buffered until a newline, so one read may yield part of a line or
//! several lines.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, trace, warn};
use viewpipe_common::WindowId;
use viewpipe_config::{DiagnosticsConfig, StderrLevel};

/// Target for forwarded native stderr lines.
pub const NATIVE_LOG_TARGET: &str = "viewpipe::native";

/// Read `stream` until EOF, calling `on_line` once per complete line.
///
/// Line terminators (`\n` or `\r\n`) are stripped, blank lines skipped, and
/// invalid UTF-8 replaced. An unterminated fragment at EOF is delivered as a
/// final line. Returns the number of lines delivered.
pub async fn read_lines<R, F>(stream: R, mut on_line: F) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut delivered = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(delivered);
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        on_line(line);
        delivered += 1;
    }
}

/// Drain the native process's stderr into the log.
///
/// Lines carry no protocol meaning. With `forward_stderr` off the stream is
/// still read to EOF so the native process never blocks on a full pipe.
pub async fn drain_stderr<R>(stderr: R, window: WindowId, diagnostics: DiagnosticsConfig)
where
    R: AsyncRead + Unpin,
{
    let short = window.short();
    let result = read_lines(stderr, |line| {
        if !diagnostics.forward_stderr {
            return;
        }
        match diagnostics.stderr_level {
            StderrLevel::Trace => trace!(target: NATIVE_LOG_TARGET, window = %short, "{line}"),
            StderrLevel::Debug => debug!(target: NATIVE_LOG_TARGET, window = %short, "{line}"),
            StderrLevel::Info => info!(target: NATIVE_LOG_TARGET, window = %short, "{line}"),
            StderrLevel::Warn => warn!(target: NATIVE_LOG_TARGET, window = %short, "{line}"),
        }
    })
    .await;

    match result {
        Ok(lines) => debug!(window = %short, lines, "native stderr closed"),
        Err(e) => warn!(window = %short, error = %e, "native stderr read failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::AsyncWriteExt;

    async fn collect(chunks: &[&[u8]]) -> Vec<String> {
        let (mut native, host) = tokio::io::duplex(16);
        let chunks: Vec<Vec<u8>> = chunks.iter().map(|c| c.to_vec()).collect();
        let writer = tokio::spawn(async move {
            for chunk in chunks {
                native.write_all(&chunk).await.unwrap();
                native.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        let mut lines = Vec::new();
        read_lines(host, |l| lines.push(l.to_string())).await.unwrap();
        writer.await.unwrap();
        lines
    }

    #[tokio::test]
    async fn partial_reads_are_reassembled() {
        let lines = collect(&[b"{\"type\":\"ev", b"ent\",\"data\"", b":\"x\"}\n"]).await;
        assert_eq!(lines, vec![r#"{"type":"event","data":"x"}"#]);
    }

    #[tokio::test]
    async fn one_read_with_several_lines_yields_each() {
        let lines = collect(&[b"a\nb\nc\n"]).await;
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn crlf_and_blank_lines() {
        let lines = collect(&[b"first\r\n\r\n\n  \nsecond\n"]).await;
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn trailing_fragment_is_delivered_at_eof() {
        let lines = collect(&[b"done\npartial"]).await;
        assert_eq!(lines, vec!["done", "partial"]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let lines = collect(&[b"ok \xff\n"]).await;
        assert_eq!(lines, vec!["ok \u{fffd}"]);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Drain `input` as stderr under a subscriber that keeps `max_level` and up.
    async fn drain_captured(
        input: &[u8],
        diagnostics: DiagnosticsConfig,
        max_level: tracing::Level,
    ) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(max_level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (mut native, host) = tokio::io::duplex(1024);
        native.write_all(input).await.unwrap();
        drop(native);
        drain_stderr(host, WindowId::new(), diagnostics).await;
        captured.text()
    }

    #[tokio::test]
    async fn drain_stderr_forwards_at_configured_level() {
        let diagnostics = DiagnosticsConfig {
            forward_stderr: true,
            stderr_level: StderrLevel::Warn,
        };
        let out = drain_captured(b"gtk warning: no theme\n", diagnostics, tracing::Level::WARN).await;

        let line = out
            .lines()
            .find(|l| l.contains("gtk warning: no theme"))
            .expect("stderr line forwarded");
        assert!(line.contains("WARN"));
        assert!(line.contains(NATIVE_LOG_TARGET));
    }

    #[tokio::test]
    async fn drain_stderr_respects_level_below_filter() {
        let diagnostics = DiagnosticsConfig {
            forward_stderr: true,
            stderr_level: StderrLevel::Debug,
        };
        let out = drain_captured(b"webkit chatter\n", diagnostics, tracing::Level::INFO).await;
        assert!(!out.contains("webkit chatter"));

        let diagnostics = DiagnosticsConfig {
            forward_stderr: true,
            stderr_level: StderrLevel::Info,
        };
        let out = drain_captured(b"webkit chatter\n", diagnostics, tracing::Level::INFO).await;
        assert!(out.contains("webkit chatter"));
    }

    #[tokio::test]
    async fn drain_stderr_drops_lines_when_not_forwarding() {
        let diagnostics = DiagnosticsConfig {
            forward_stderr: false,
            stderr_level: StderrLevel::Warn,
        };
        let out = drain_captured(b"hidden\n", diagnostics, tracing::Level::TRACE).await;
        assert!(!out.contains("hidden"));
    }

    #[tokio::test]
    async fn drain_stderr_reads_to_eof_when_not_forwarding() {
        let (mut native, host) = tokio::io::duplex(8);
        let diagnostics = DiagnosticsConfig {
            forward_stderr: false,
            ..Default::default()
        };
        let pump = tokio::spawn(drain_stderr(host, WindowId::new(), diagnostics));

        // Larger than the pipe buffer: only completes if the pump keeps reading.
        native.write_all(&[b'x'; 256]).await.unwrap();
        native.write_all(b"\n").await.unwrap();
        drop(native);
        pump.await.unwrap();
    }
}
