//! Probe configuration loaded from environment variables.
//!
//! Every setting has a default matching the local development server, so
//! running the probe with an empty environment targets
//! `ws://localhost:8000/ws/notifications` for 30 seconds. A `.env` file in
//! the working directory is honoured via `dotenvy`.

use std::time::Duration;

use crate::error::ProbeError;

/// Endpoint probed when `PROBE_URL` is not set.
pub const DEFAULT_URL: &str = "ws://localhost:8000/ws/notifications";

/// Keep-alive text sent right after connecting.
pub const DEFAULT_KEEPALIVE: &str = "ping";

/// Settings for a single probe run.
///
/// Loaded once at startup via [`ProbeConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub url: String,

    /// Wall-clock budget of the receive loop.
    pub listen_window: Duration,

    /// Longest wait for a single message before checking the deadline again.
    pub recv_timeout: Duration,

    /// Bound on TCP connect plus WebSocket handshake.
    pub connect_timeout: Duration,

    /// Text frame sent once after connecting.
    pub keepalive: String,

    /// Emit diagnostics as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            listen_window: Duration::from_secs(30),
            recv_timeout: Duration::from_millis(1000),
            connect_timeout: Duration::from_secs(10),
            keepalive: DEFAULT_KEEPALIVE.to_string(),
            log_json: false,
        }
    }
}

impl ProbeConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidConfig`] if `PROBE_URL` is not a
    /// WebSocket URL or `PROBE_RECV_TIMEOUT_MS` is zero.
    pub fn from_env() -> Result<Self, ProbeError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Numeric values that are missing or unparsable fall back to the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Same as [`ProbeConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProbeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let url = lookup("PROBE_URL").unwrap_or(defaults.url);
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ProbeError::InvalidConfig(format!(
                "PROBE_URL must start with ws:// or wss://, got {url:?}"
            )));
        }

        let listen_window = Duration::from_secs(parse_var(&lookup, "PROBE_LISTEN_SECS", 30));
        let recv_timeout =
            Duration::from_millis(parse_var(&lookup, "PROBE_RECV_TIMEOUT_MS", 1000));
        if recv_timeout.is_zero() {
            return Err(ProbeError::InvalidConfig(
                "PROBE_RECV_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        let connect_timeout =
            Duration::from_secs(parse_var(&lookup, "PROBE_CONNECT_TIMEOUT_SECS", 10));

        let keepalive = lookup("PROBE_KEEPALIVE").unwrap_or(defaults.keepalive);

        let log_json = lookup("PROBE_LOG_FORMAT")
            .is_some_and(|format| format.trim().eq_ignore_ascii_case("json"));

        Ok(Self {
            url,
            listen_window,
            recv_timeout,
            connect_timeout,
            keepalive,
            log_json,
        })
    }
}

/// Parses a looked-up variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
