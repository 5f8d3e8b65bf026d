//! Probe error types.
//!
//! [`ProbeError`] is the single error type of the crate. Network failures
//! end up inside a [`ProbeReport`](crate::probe::ProbeReport); only
//! configuration and console write failures are returned to `main`.

use std::time::Duration;

use tokio_tungstenite::tungstenite;

/// Everything that can go wrong while probing a notification endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// A configuration value was present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// TCP connect or WebSocket handshake failed.
    #[error("{0}")]
    Connect(#[source] tungstenite::Error),

    /// The connection was not established within the connect timeout.
    #[error("connection timed out after {} ms", .0.as_millis())]
    ConnectTimeout(Duration),

    /// Writing a frame to the server failed.
    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    /// Transport error while waiting for a frame.
    #[error("{0}")]
    Receive(#[source] tungstenite::Error),

    /// The server closed the connection, or the stream ended.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// A data frame did not contain valid JSON.
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// Writing to the console failed.
    #[error("console write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Returns `true` for errors raised by the network or the peer,
    /// as opposed to local configuration or console failures.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Connect(_)
                | Self::ConnectTimeout(_)
                | Self::Send(_)
                | Self::Receive(_)
                | Self::ConnectionClosed
        )
    }
}
