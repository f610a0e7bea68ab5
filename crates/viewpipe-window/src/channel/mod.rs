//! Byte-level plumbing between a controller and its native process.
//!
//! - [`outbound`]: a single writer task owns stdin and writes queued
//!   command lines in FIFO order.
//! - [`inbound`]: pumps that reassemble stdout into lines and drain stderr.

pub mod inbound;
pub mod outbound;

pub use inbound::{drain_stderr, read_lines};
pub use outbound::{spawn_writer, CommandSender};
