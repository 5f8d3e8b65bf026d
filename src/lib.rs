//! # notification-probe
//!
//! Diagnostic WebSocket client for the notification endpoint.
//!
//! The probe opens one connection, sends a keep-alive text frame, then
//! prints every JSON message the server pushes during a fixed listening
//! window. It is meant for checking by hand that a running server accepts
//! connections and actually delivers notifications.
//!
//! ## Flow
//!
//! ```text
//! ProbeConfig (config/)
//!     │
//!     ├── probe::run
//!     │     ├── Connection::open      (ws/connection)
//!     │     ├── send keep-alive
//!     │     ├── recv with timeout ──► decode_frame / classify (ws/messages)
//!     │     └── Connection::close
//!     │
//!     └── Console (console/) ──► stdout
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod probe;
pub mod ws;
