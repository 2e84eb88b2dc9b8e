//! Beacon tracking-pixel service.
//!
//! Main entry point for the beacon server. Initializes logging, loads
//! configuration, and serves the signal endpoint until shutdown.

use anyhow::Result;
use beacon::{AppState, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with structured logging
    init_tracing();

    info!("Starting beacon tracking-pixel service");

    // Load configuration from defaults, config.toml, and environment
    let config = Config::load()?;
    let addr = config.parse_server_addr()?;
    info!(
        server_addr = %addr,
        notifications = config.ntfy_url.is_some(),
        remote_image = config.image_url.is_some(),
        require_signature = config.require_signature,
        "Configuration loaded"
    );

    let state = AppState::from_config(config)?;

    beacon::start_server(state, addr).await?;

    info!("Beacon shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,beacon=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
