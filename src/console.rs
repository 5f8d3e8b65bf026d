//! Human-readable status lines.
//!
//! The probe's user-facing output is a fixed set of decorated lines. They
//! are written through [`Console`] so tests can capture them in a buffer
//! while the binary writes to stdout. Diagnostics go through `tracing`
//! instead and never reach this writer.

use std::fmt::Display;
use std::io::{self, Write};

use crate::ws::messages::{InboundMessage, Notification};

/// Line-oriented console writer.
#[derive(Debug)]
pub struct Console<W> {
    out: W,
}

impl<W: Write> Console<W> {
    /// Wraps a writer.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn starting(&mut self) -> io::Result<()> {
        self.line("🚀 Starting WebSocket notification test...")
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn connected(&mut self) -> io::Result<()> {
        self.line("✅ Connected to WebSocket server")
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn sent(&mut self, keepalive: &str) -> io::Result<()> {
        self.line(format_args!("📤 Sent {keepalive} message"))
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn listening(&mut self) -> io::Result<()> {
        self.line("👂 Listening for notifications...")
    }

    /// Prints a received message: the compact JSON, followed by a detail
    /// line for typed notifications.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn received(&mut self, raw: &serde_json::Value, message: &InboundMessage) -> io::Result<()> {
        self.line(format_args!("📨 Received notification: {raw}"))?;
        if let InboundMessage::Notification(notification) = message {
            self.notification_detail(notification)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn receive_error(&mut self, err: &dyn Display) -> io::Result<()> {
        self.line(format_args!("❌ Error receiving message: {err}"))
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn send_error(&mut self, err: &dyn Display) -> io::Result<()> {
        self.line(format_args!("❌ Failed to send keep-alive: {err}"))
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn completed(&mut self) -> io::Result<()> {
        self.line("⏰ Test completed")
    }

    /// # Errors
    ///
    /// Propagates write failures.
    pub fn connect_error(&mut self, err: &dyn Display) -> io::Result<()> {
        self.line(format_args!("❌ Failed to connect to WebSocket: {err}"))
    }

    fn notification_detail(&mut self, notification: &Notification) -> io::Result<()> {
        self.line(format_args!("   🔔 {}", notification.summary()))
    }

    fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }
}
