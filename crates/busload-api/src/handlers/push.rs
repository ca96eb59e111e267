//! Push ingestion handler with storage fallback and webhook dispatch.

use axum::{extract::State, Json};
use busload_core::{ApiResponse, PushPayload, PushRecord};
use busload_store::PUSH_TABLE;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use crate::{error::ApiError, extract::ValidatedJson, AppState};

/// Ingests a push payload, persisting it and notifying downstream.
///
/// A storage failure does not fail the request: the gateway still
/// acknowledges with 200 and records the failure in the response's
/// `database_error` field. The webhook fires only for payloads whose
/// normalized document carries `detection_results`, only after a
/// successful insert, and never on the request's own time.
///
/// # Errors
///
/// Returns `ApiError::Unexpected` when response assembly fails.
/// Storage and webhook failures are absorbed.
#[instrument(name = "push_data", skip(state, payload))]
pub async fn push_data(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PushPayload>,
) -> Result<Json<ApiResponse>, ApiError> {
    let record_uuid = payload.record_uuid();
    let data_content = payload.data_content();
    let payload_size = serde_json::to_string(&data_content)?.len();
    let wants_notification = has_detection_results(&data_content);

    debug!(record_uuid = %record_uuid, payload_size, "Processing push payload");

    let mut record = PushRecord::new(record_uuid, data_content, payload.metadata, Utc::now());
    let document = serde_json::to_value(&record)?;

    let mut notification: Option<(i64, Value)> = None;

    match state.store.insert(PUSH_TABLE, &document).await {
        Ok(row) => {
            info!(record_uuid = %record_uuid, row_id = row.id, "Push request stored");

            if wants_notification {
                let mut data = record.data.clone();
                if let Some(doc) = data.as_object_mut() {
                    doc.insert("uuid".to_string(), Value::String(record_uuid.to_string()));
                }
                notification = Some((row.id, data));
            }
        },
        Err(e) => {
            error!(error = %e, record_uuid = %record_uuid, "Storing push request failed");
            record.database_error = Some(e.to_string());
        },
    }

    let body = ApiResponse::success(
        "Data processed successfully",
        json!({
            "processed_data": record,
            "payload_size": payload_size,
        }),
    );

    // Dispatch happens after the response body exists, on its own task.
    if let Some((record_id, data)) = notification {
        state.notifier.spawn_notify(record_id, data);
    }

    Ok(Json(body))
}

/// Whether the normalized document carries a `detection_results` key.
fn has_detection_results(data_content: &Value) -> bool {
    data_content.as_object().is_some_and(|doc| doc.contains_key("detection_results"))
}
