//! notification-probe entry point.
//!
//! Loads configuration, runs a single probe and writes its status lines to
//! stdout. Network failures are reported but do not change the exit code.

use std::io;

use tracing_subscriber::EnvFilter;

use notification_probe::config::ProbeConfig;
use notification_probe::console::Console;
use notification_probe::probe;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (also reads .env, which may set RUST_LOG)
    let config = ProbeConfig::from_env()?;

    // Initialize tracing on stderr; stdout is reserved for status lines
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    tracing::info!(
        url = %config.url,
        listen_secs = config.listen_window.as_secs(),
        "starting notification probe"
    );

    let mut console = Console::new(io::stdout().lock());
    let report = probe::run(&config, &mut console).await?;

    if let Some(err) = report.outcome.error() {
        tracing::debug!(error = %err, connected = report.outcome.connected(), "probe ended early");
    }

    Ok(())
}
