//! Bus occupancy gateway service.
//!
//! Main entry point for the busload server. Loads configuration and
//! tracing, then runs the HTTP gateway until a shutdown signal
//! arrives.

use anyhow::{Context, Result};
use busload_api::{start_server, AppState, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Starting bus occupancy gateway"
    );

    // Credentials only ever reach the logs as masked prefixes.
    if config.environment.is_development() {
        info!(
            database_url = %config.database_url,
            database_key = %config.database_key_masked(),
            bearer_token = %config.bearer_token_masked(),
            webhook_url = %config.webhook_url,
            "Configuration loaded"
        );
    }

    let addr = config.parse_server_addr()?;
    let state = AppState::from_config(config)?;

    start_server(state, addr).await.context("Server failed")?;

    info!("Gateway shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing(default_filter: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("Invalid RUST_LOG configuration")?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    Ok(())
}
