//! Bus occupancy update and retrieval handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use busload_core::{ApiResponse, OccupancyRecord, OccupancyUpdate};
use busload_store::OCCUPANCY_TABLE;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, instrument};

use crate::{error::ApiError, extract::ValidatedJson, AppState};

/// Stores one occupancy snapshot with the percentage derived here.
///
/// The stored percentage is always computed from the submitted counts;
/// anything the client claims is ignored. Unlike `/api/v1/push`, a
/// storage failure is a hard 500: an acknowledged update must actually
/// be persisted.
///
/// # Errors
///
/// Returns `ApiError::Validation` when `max_capacity` is zero and
/// `ApiError::Storage` when the insert fails.
#[instrument(name = "update_bus_occupancy", skip(state, update), fields(bus_id = %update.bus_id))]
pub async fn update_bus_occupancy(
    State(state): State<AppState>,
    ValidatedJson(update): ValidatedJson<OccupancyUpdate>,
) -> Result<Json<ApiResponse>, ApiError> {
    update.validate()?;

    let record = OccupancyRecord::from_update(update, Utc::now());
    let document = serde_json::to_value(&record)?;

    if let Err(e) = state.store.insert(OCCUPANCY_TABLE, &document).await {
        error!(error = %e, "Storing occupancy update failed");
        return Err(ApiError::storage("Failed to store occupancy data", e));
    }

    info!(occupancy_percentage = record.occupancy_percentage, "Bus occupancy stored");

    Ok(Json(ApiResponse::success(
        "Bus occupancy updated successfully",
        json!({
            "bus_id": record.bus_id,
            "occupancy_percentage": record.occupancy_percentage,
            "timestamp": record.timestamp,
        }),
    )))
}

/// Returns the latest stored snapshot for one bus.
///
/// Scans the table and resolves in memory: rows are filtered on the
/// document's `bus_id` and the one with the greatest `created_at`
/// wins.
///
/// # Errors
///
/// Returns `ApiError::NotFound` when the bus has no stored snapshots
/// and `ApiError::Storage` when the scan fails.
#[instrument(name = "get_bus_occupancy", skip(state))]
pub async fn get_bus_occupancy(
    State(state): State<AppState>,
    Path(bus_id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let rows = state.store.fetch_all(OCCUPANCY_TABLE).await.map_err(|e| {
        error!(error = %e, "Scanning occupancy table failed");
        ApiError::storage(format!("Failed to retrieve occupancy data: {e}"), e)
    })?;

    let latest = rows
        .into_iter()
        .filter(|row| row.json_data.get("bus_id").and_then(Value::as_str) == Some(bus_id.as_str()))
        .max_by_key(|row| row.created_at);

    let Some(row) = latest else {
        return Err(ApiError::not_found(format!("No occupancy data found for bus {bus_id}")));
    };

    info!(row_id = row.id, "Occupancy data retrieved");

    Ok(Json(ApiResponse::success(
        "Bus occupancy data retrieved successfully",
        serde_json::to_value(&row)?,
    )))
}
