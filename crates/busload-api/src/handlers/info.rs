//! Root informational endpoint.

use axum::{extract::State, Json};
use busload_core::ApiResponse;

use crate::AppState;

/// Identifies the running service with its version and environment.
///
/// Lives outside the authenticated route group so uptime monitors can
/// reach it without credentials.
pub async fn service_info(State(state): State<AppState>) -> Json<ApiResponse> {
    Json(ApiResponse::success(
        "Bus occupancy gateway is running",
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment.to_string(),
        }),
    ))
}
