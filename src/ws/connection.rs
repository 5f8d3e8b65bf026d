//! Outbound WebSocket connection to the notification endpoint.
//!
//! [`Connection`] owns the stream for its whole lifetime. Opening is
//! bounded by a timeout, and every receive waits at most the duration the
//! caller passes, so a silent server never blocks the probe past its
//! deadline.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::ProbeError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An established client connection.
#[derive(Debug)]
pub struct Connection {
    stream: WsStream,
}

impl Connection {
    /// Connects and completes the WebSocket handshake.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::ConnectTimeout`] if the handshake does not
    /// finish within `connect_timeout`, or [`ProbeError::Connect`] if the
    /// TCP connect or the upgrade is rejected.
    pub async fn open(url: &str, connect_timeout: Duration) -> Result<Self, ProbeError> {
        let (stream, response) =
            tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(url))
                .await
                .map_err(|_| ProbeError::ConnectTimeout(connect_timeout))?
                .map_err(ProbeError::Connect)?;

        tracing::debug!(url, status = %response.status(), "websocket handshake complete");
        Ok(Self { stream })
    }

    /// Sends one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Send`] if the frame cannot be written.
    pub async fn send_text(&mut self, text: &str) -> Result<(), ProbeError> {
        self.stream
            .send(Message::text(text.to_owned()))
            .await
            .map_err(ProbeError::Send)
    }

    /// Waits up to `wait` for the next frame.
    ///
    /// Returns `Ok(None)` when nothing arrived in time.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::ConnectionClosed`] when the stream has ended
    /// and [`ProbeError::Receive`] on any other transport error.
    pub async fn recv(&mut self, wait: Duration) -> Result<Option<Message>, ProbeError> {
        match tokio::time::timeout(wait, self.stream.next()).await {
            Err(_elapsed) => Ok(None),
            Ok(None) => Err(ProbeError::ConnectionClosed),
            Ok(Some(Ok(message))) => Ok(Some(message)),
            Ok(Some(Err(
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
            ))) => Err(ProbeError::ConnectionClosed),
            Ok(Some(Err(err))) => Err(ProbeError::Receive(err)),
        }
    }

    /// Sends a close frame and drops the stream.
    ///
    /// Failures are logged and otherwise ignored; the socket is released
    /// either way.
    pub async fn close(mut self) {
        if let Err(err) = self.stream.close(None).await {
            tracing::debug!(error = %err, "close handshake failed");
        }
    }
}
