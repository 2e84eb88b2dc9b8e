//! Health check handlers for service monitoring.
//!
//! Provides health and liveness endpoints for orchestration systems. The
//! service has no hard external dependencies, so the image cache and
//! notification configuration are reported informationally and never make
//! the service unhealthy.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::server::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status
    pub status: HealthStatus,
    /// Timestamp when health check was performed
    pub timestamp: DateTime<Utc>,
    /// Individual component states
    pub checks: HealthChecks,
    /// Service version information
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
}

/// Individual component states.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// State of the in-memory remote image cache
    pub image_cache: CacheState,
    /// Whether view notifications are configured
    pub notifications: ToggleState,
}

/// State of the remote image cache.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No image origin configured; the pixel is always served
    Disabled,
    /// Origin configured but not fetched yet
    Empty,
    /// Origin fetched and cached for the process lifetime
    Cached,
}

/// Whether an optional outbound integration is configured.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    /// Integration is configured
    Enabled,
    /// Integration is not configured
    Disabled,
}

/// Health check endpoint handler.
///
/// This endpoint is designed to be called frequently by orchestration
/// systems and load balancers, so it avoids expensive operations.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    debug!("performing health check");

    let image_cache = if !state.images.is_enabled() {
        CacheState::Disabled
    } else if state.images.is_cached() {
        CacheState::Cached
    } else {
        CacheState::Empty
    };

    let notifications =
        if state.notifier.is_enabled() { ToggleState::Enabled } else { ToggleState::Disabled };

    let response = HealthResponse {
        status: HealthStatus::Healthy,
        timestamp: Utc::now(),
        checks: HealthChecks { image_cache, notifications },
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Liveness check endpoint for Kubernetes probes.
///
/// Returns a minimal response indicating the service process is alive
/// without inspecting any state.
#[instrument(name = "liveness_check")]
pub async fn liveness_check() -> Response {
    let response = serde_json::json!({
        "status": "alive",
        "timestamp": Utc::now(),
        "service": "beacon"
    });

    (StatusCode::OK, Json(response)).into_response()
}
