//! The probe run: connect, send the keep-alive, listen, close.
//!
//! [`run`] drives a single connection through its whole life and reports
//! what happened in a [`ProbeReport`]. Network failures never escape as
//! errors; they end the run early and are recorded in the report's
//! [`ProbeOutcome`].

use std::io::Write;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::ProbeConfig;
use crate::console::Console;
use crate::error::ProbeError;
use crate::ws::connection::Connection;
use crate::ws::messages::{InboundMessage, decode_frame};

/// How a probe run ended.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The listen window elapsed.
    Completed,
    /// The receive loop stopped early.
    ReceiveFailed(ProbeError),
    /// The keep-alive could not be sent.
    SendFailed(ProbeError),
    /// No connection was established.
    ConnectFailed(ProbeError),
}

impl ProbeOutcome {
    /// Returns `true` if the connection was established.
    #[must_use]
    pub const fn connected(&self) -> bool {
        !matches!(self, Self::ConnectFailed(_))
    }

    /// Returns the error that ended the run, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ProbeError> {
        match self {
            Self::Completed => None,
            Self::ReceiveFailed(err) | Self::SendFailed(err) | Self::ConnectFailed(err) => {
                Some(err)
            }
        }
    }
}

/// Summary of a probe run.
#[derive(Debug)]
pub struct ProbeReport {
    /// How the run ended.
    pub outcome: ProbeOutcome,
    /// Every decoded message, in arrival order.
    pub received: Vec<InboundMessage>,
    /// Wall-clock time from the first connect attempt to the end.
    pub elapsed: Duration,
}

/// Runs one probe against `config.url`, writing status lines to `console`.
///
/// # Errors
///
/// Returns [`ProbeError::Io`] only if writing to the console fails.
/// Connection, send and receive failures are reported in
/// [`ProbeReport::outcome`].
pub async fn run<W: Write>(
    config: &ProbeConfig,
    console: &mut Console<W>,
) -> Result<ProbeReport, ProbeError> {
    let started = Instant::now();
    console.starting()?;

    let mut connection = match Connection::open(&config.url, config.connect_timeout).await {
        Ok(connection) => connection,
        Err(err) => {
            tracing::warn!(url = %config.url, error = %err, "connect failed");
            console.connect_error(&err)?;
            return Ok(ProbeReport {
                outcome: ProbeOutcome::ConnectFailed(err),
                received: Vec::new(),
                elapsed: started.elapsed(),
            });
        }
    };
    tracing::info!(url = %config.url, "connected");
    console.connected()?;

    if let Err(err) = connection.send_text(&config.keepalive).await {
        tracing::warn!(error = %err, "keep-alive send failed");
        console.send_error(&err)?;
        connection.close().await;
        return Ok(ProbeReport {
            outcome: ProbeOutcome::SendFailed(err),
            received: Vec::new(),
            elapsed: started.elapsed(),
        });
    }
    console.sent(&config.keepalive)?;

    console.listening()?;
    let listened = listen(&mut connection, config, console).await;
    let completed = console.completed();
    connection.close().await;

    let (outcome, received) = listened?;
    completed?;
    let elapsed = started.elapsed();
    tracing::info!(
        received = received.len(),
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        "probe finished"
    );
    Ok(ProbeReport {
        outcome,
        received,
        elapsed,
    })
}

/// Start time plus `window`, clamped for windows too large to represent.
fn deadline_after(window: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(window).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Upper bound on the listen window, roughly thirty years.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// The timed receive loop.
///
/// Console failures are returned as `Err`; everything else ends the loop
/// with the matching outcome.
async fn listen<W: Write>(
    connection: &mut Connection,
    config: &ProbeConfig,
    console: &mut Console<W>,
) -> Result<(ProbeOutcome, Vec<InboundMessage>), ProbeError> {
    let deadline = deadline_after(config.listen_window);
    let mut received = Vec::new();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok((ProbeOutcome::Completed, received));
        }

        let frame = connection
            .recv(config.recv_timeout.min(remaining))
            .await
            .and_then(|frame| frame.as_ref().map(decode_frame).transpose());

        match frame {
            // Idle or control frame.
            Ok(None | Some(None)) => {}
            Ok(Some(Some(value))) => {
                let message = InboundMessage::classify(value.clone(), chrono::Utc::now());
                tracing::debug!(count = received.len() + 1, "message received");
                console.received(&value, &message)?;
                received.push(message);
            }
            Err(err) => {
                if err.is_network() {
                    tracing::warn!(error = %err, "receive loop ended by transport");
                } else {
                    tracing::warn!(error = %err, "receive loop ended by bad payload");
                }
                console.receive_error(&err)?;
                return Ok((ProbeOutcome::ReceiveFailed(err), received));
            }
        }
    }
}
