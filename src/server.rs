//! HTTP server configuration and request routing.
//!
//! Provides Axum server setup with middleware stack and graceful shutdown
//! for the tracking-pixel endpoint. Requests flow through middleware in
//! order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. Timeout enforcement
//! 4. Handler execution
//!
//! # Graceful Shutdown
//!
//! The server handles SIGTERM gracefully: it stops accepting new
//! connections and waits for in-flight requests before exiting.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    error::Result,
    handlers,
    handlers::signal::SIGNAL_PREFIX,
    image::{FetchConfig, ImageStore},
    notify::{Notifier, NotifyConfig},
};

/// Shared application state injected into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded service configuration.
    pub config: Arc<Config>,
    /// Best-effort view notification client.
    pub notifier: Notifier,
    /// Process-lifetime remote image cache.
    pub images: ImageStore,
}

impl AppState {
    /// Builds application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `BeaconError::Configuration` if either HTTP client cannot be
    /// constructed.
    pub fn from_config(config: Config) -> Result<Self> {
        let notifier = Notifier::new(NotifyConfig {
            url: config.ntfy_url.clone(),
            timeout: config.notify_timeout(),
            ..NotifyConfig::default()
        })?;

        let images = ImageStore::new(FetchConfig {
            url: config.image_url.clone(),
            timeout: config.fetch_timeout(),
            max_redirects: config.fetch_max_redirects,
            ..FetchConfig::default()
        })?;

        Ok(Self { config: Arc::new(config), notifier, images })
    }
}

/// Creates the Axum router with all routes and middleware.
///
/// Sets up the signal endpoint (with and without a payload tail), health
/// probes, request tracing, and timeout handling.
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout);

    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/live", get(handlers::liveness_check));

    let signal_routes = Router::new()
        .route(SIGNAL_PREFIX, get(handlers::serve_signal))
        .route(&format!("{SIGNAL_PREFIX}/"), get(handlers::serve_signal))
        .route(&format!("{SIGNAL_PREFIX}/{{*payload}}"), get(handlers::serve_signal));

    Router::new()
        .merge(health_routes)
        .merge(signal_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject request ID into all responses.
///
/// Adds X-Request-Id header for tracing requests across services.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Binds to the specified address and serves requests until a shutdown
/// signal is received.
///
/// # Errors
///
/// Returns `std::io::Error` if the port is already in use or the network
/// interface is unavailable.
pub async fn start_server(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
///
/// Enables graceful shutdown on:
/// - CTRL+C (SIGINT) - Development
/// - SIGTERM - Kubernetes/Docker
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Waiting for in-flight requests to complete");
}
