//! Health check handler for service monitoring.
//!
//! Probes the managed store and folds the result into an overall
//! status for orchestration systems and load balancers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use busload_core::ApiResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// Overall service health status
    pub status: HealthStatus,
    /// Timestamp when the check was performed
    pub timestamp: DateTime<Utc>,
    /// Service version information
    pub version: String,
    /// Whether the managed store answered the connectivity probe
    pub database_connected: bool,
}

impl HealthReport {
    fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database_connected: true,
        }
    }

    fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database_connected: false,
        }
    }
}

/// Overall health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Gateway and store both operational
    Healthy,
    /// Gateway up, store unreachable; push ingestion keeps answering
    Degraded,
}

/// Health check endpoint handler.
///
/// Store connectivity loss only degrades the report: `/api/v1/push`
/// still answers without storage, so the process stays in rotation.
/// Rejected store credentials fail the check outright since every
/// write and read will fail until the deployment is reconfigured.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let report = match state.store.probe().await {
        Ok(()) => HealthReport::healthy(),
        Err(e) if e.is_connectivity() => {
            warn!(error = %e, "Store unreachable, reporting degraded");
            HealthReport::degraded()
        },
        Err(e) => {
            error!(error = %e, "Store rejected the health probe");
            let body = ApiResponse::failure("Service unhealthy");
            return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
        },
    };

    debug!(status = ?report.status, "Health check completed");

    (StatusCode::OK, Json(report)).into_response()
}
