//! hubsync webhook service.
//!
//! Main entry point. Loads configuration, selects the secret provider,
//! serves webhooks and coordinates graceful shutdown.

use std::time::Duration;

use anyhow::{Context, Result};
use hubsync_api::{server::shutdown_signal, start_server, AppState, Config};
use tracing::{error, info};

/// Fallback filter when the configured one does not parse.
const DEFAULT_LOG_FILTER: &str = "info,hubsync=debug,tower_http=debug";

/// Time allowed for in-flight updates after a shutdown signal.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log)?;

    info!("Starting hubsync webhook service");

    let addr = config.parse_server_addr()?;
    info!(
        server_addr = %addr,
        secret_variant = ?config.secret_variant(),
        repository = %config.repository_path.display(),
        push_changes = config.git_push_changes,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config)?;

    let server_handle = tokio::spawn({
        let request_timeout = config.request_timeout();
        async move {
            if let Err(e) = start_server(state, addr, request_timeout).await {
                error!(error = %e, "Server failed");
            }
        }
    });

    info!(addr = %addr, "hubsync is ready to receive webhooks");

    shutdown_signal().await;

    tokio::select! {
        _ = tokio::time::sleep(SHUTDOWN_GRACE_PERIOD) => {
            info!("Shutdown grace period expired");
        }
        _ = server_handle => {
            info!("Server stopped");
        }
    }

    info!("hubsync shutdown complete");
    Ok(())
}

/// Initializes tracing from the configured filter.
///
/// Diagnostics go to stderr; stdout stays free for the process supervisor.
fn init_tracing(filter: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(filter)
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Invalid log filter")?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing")
}
