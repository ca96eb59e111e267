//! Domain models for push ingestion and bus occupancy tracking.
//!
//! Defines the response envelope shared by every endpoint, the
//! semi-structured push payload with its normalization rules, and the
//! occupancy snapshot types with their server-side derivations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Uniform response envelope returned by every endpoint.
///
/// Success and failure responses share this shape so clients can branch on
/// `success` without inspecting HTTP status codes first.
///
/// # Example
///
/// ```
/// use busload_core::models::ApiResponse;
///
/// let body = ApiResponse::success("Data processed successfully", serde_json::json!({"n": 1}));
/// assert!(body.success);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Human-readable outcome description.
    pub message: String,

    /// Endpoint-specific payload. Always serialized, `null` when absent.
    pub data: Option<Value>,

    /// When this response was produced.
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    /// Builds a success envelope carrying `data`.
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self { success: true, message: message.into(), data: Some(data), timestamp: Utc::now() }
    }

    /// Builds a failure envelope with no payload.
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), data: None, timestamp: Utc::now() }
    }

    /// Builds a failure envelope carrying diagnostic data.
    pub fn failure_with_data(message: impl Into<String>, data: Value) -> Self {
        Self { success: false, message: message.into(), data: Some(data), timestamp: Utc::now() }
    }
}

/// Semi-structured inbound push payload.
///
/// Producers have shipped several payload shapes over time, so only three
/// fields are recognized. Everything else lands in `extra` verbatim and
/// travels with the record instead of being rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushPayload {
    /// Caller-supplied record identifier. Generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,

    /// Explicit data document. When present it wins over the loose fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Caller context stored alongside the data but never forwarded in it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    /// Unrecognized fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PushPayload {
    /// Record identifier for this payload: the caller's `uuid` when
    /// supplied, otherwise a fresh v4.
    pub fn record_uuid(&self) -> Uuid {
        self.uuid.unwrap_or_else(Uuid::new_v4)
    }

    /// Normalizes the payload into the document that gets stored and
    /// forwarded downstream.
    ///
    /// An explicit `data` field is taken verbatim. Otherwise the document is
    /// rebuilt from the payload itself with `metadata` stripped: the `uuid`
    /// (when supplied) plus every unrecognized field.
    pub fn data_content(&self) -> Value {
        if let Some(data) = &self.data {
            return data.clone();
        }
        let mut doc = Map::new();
        if let Some(uuid) = self.uuid {
            doc.insert("uuid".to_string(), Value::String(uuid.to_string()));
        }
        doc.extend(self.extra.iter().map(|(key, value)| (key.clone(), value.clone())));
        Value::Object(doc)
    }
}

/// Persisted push document, created once per inbound request.
///
/// Never mutated after creation. A failed write is reflected only in the
/// response via `database_error`; the record is not retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRecord {
    /// Record identifier, caller-supplied or generated.
    pub uuid: Uuid,

    /// When the gateway accepted the payload.
    pub received_at: DateTime<Utc>,

    /// Normalized data document.
    pub data: Value,

    /// Caller-supplied metadata, empty object when omitted.
    pub metadata: Map<String, Value>,

    /// Set on the write path; records are never revisited.
    pub processed: bool,

    /// Storage failure message, present only when the insert failed and the
    /// record is being returned to the caller unpersisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
}

impl PushRecord {
    /// Assembles the record for a normalized payload.
    pub fn new(
        uuid: Uuid,
        data: Value,
        metadata: Option<Map<String, Value>>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            uuid,
            received_at,
            data,
            metadata: metadata.unwrap_or_default(),
            processed: true,
            database_error: None,
        }
    }
}

/// Inbound bus occupancy snapshot.
///
/// The counts are unsigned so negative values are rejected at the JSON
/// boundary. There is no inbound percentage field at all; the served value
/// is always derived here, so a client cannot spoof it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyUpdate {
    /// Unique identifier for the bus.
    pub bus_id: String,

    /// Route the bus is serving.
    pub route_id: String,

    /// Number of passengers detected.
    pub occupancy_count: u32,

    /// Seat capacity of the bus.
    pub max_capacity: u32,

    /// Snapshot time. Defaults to the gateway clock when omitted.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// GPS coordinates keyed by axis name.
    #[serde(default)]
    pub location: Option<HashMap<String, f64>>,
}

impl OccupancyUpdate {
    /// Checks the constraints the JSON shape cannot express.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` when `max_capacity` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(CoreError::invalid_input("max_capacity must be greater than 0"));
        }
        Ok(())
    }

    /// Seat utilization as a percentage of capacity.
    ///
    /// May exceed 100 when more passengers are detected than seats exist.
    pub fn occupancy_percentage(&self) -> f64 {
        f64::from(self.occupancy_count) / f64::from(self.max_capacity) * 100.0
    }
}

/// Persisted occupancy snapshot with the derived percentage.
///
/// Append-only. The read path resolves "current" as the stored row with the
/// greatest `created_at`, so history accumulates without updates in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyRecord {
    /// Unique identifier for the bus.
    pub bus_id: String,

    /// Route the bus is serving.
    pub route_id: String,

    /// Number of passengers detected.
    pub occupancy_count: u32,

    /// Seat capacity of the bus.
    pub max_capacity: u32,

    /// Derived utilization, never taken from the client.
    pub occupancy_percentage: f64,

    /// Snapshot time, defaulted at ingestion when the client omitted it.
    pub timestamp: DateTime<Utc>,

    /// GPS coordinates keyed by axis name.
    pub location: Option<HashMap<String, f64>>,
}

impl OccupancyRecord {
    /// Builds the persisted snapshot from a validated update.
    pub fn from_update(update: OccupancyUpdate, now: DateTime<Utc>) -> Self {
        let occupancy_percentage = update.occupancy_percentage();
        Self {
            bus_id: update.bus_id,
            route_id: update.route_id,
            occupancy_count: update.occupancy_count,
            max_capacity: update.max_capacity,
            occupancy_percentage,
            timestamp: update.timestamp.unwrap_or(now),
            location: update.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn explicit_data_field_wins_over_loose_fields() {
        let payload: PushPayload = serde_json::from_value(json!({
            "data": {"detection_results": [1, 2, 3]},
            "stray": "ignored"
        }))
        .expect("payload deserializes");

        assert_eq!(payload.data_content(), json!({"detection_results": [1, 2, 3]}));
    }

    #[test]
    fn loose_fields_survive_normalization_without_metadata() {
        let payload: PushPayload = serde_json::from_value(json!({
            "uuid": "6f4b5c0a-08a4-4b18-9be4-6f1a46a7c2da",
            "metadata": {"source": "camera-3"},
            "frame": 12,
            "detection_results": []
        }))
        .expect("payload deserializes");

        let doc = payload.data_content();
        let doc = doc.as_object().expect("normalized document is an object");
        assert_eq!(doc["uuid"], json!("6f4b5c0a-08a4-4b18-9be4-6f1a46a7c2da"));
        assert_eq!(doc["frame"], json!(12));
        assert!(doc.contains_key("detection_results"));
        assert!(!doc.contains_key("metadata"));
    }

    #[test]
    fn record_uuid_echoes_supplied_value() {
        let supplied = Uuid::new_v4();
        let payload = PushPayload { uuid: Some(supplied), ..PushPayload::default() };
        assert_eq!(payload.record_uuid(), supplied);
    }

    #[test]
    fn record_uuid_generated_when_absent() {
        let payload = PushPayload::default();
        assert!(payload.uuid.is_none());
        assert_ne!(payload.record_uuid(), payload.record_uuid());
    }

    #[test]
    fn occupancy_percentage_derived_from_counts() {
        let update: OccupancyUpdate = serde_json::from_value(json!({
            "bus_id": "B1",
            "route_id": "R1",
            "occupancy_count": 18,
            "max_capacity": 41
        }))
        .expect("update deserializes");

        assert!((update.occupancy_percentage() - 43.90).abs() < 0.005);
    }

    #[test]
    fn zero_capacity_rejected_by_validation() {
        let update = OccupancyUpdate {
            bus_id: "B1".to_string(),
            route_id: "R1".to_string(),
            occupancy_count: 0,
            max_capacity: 0,
            timestamp: None,
            location: None,
        };

        assert!(update.validate().is_err());
    }

    #[test]
    fn negative_count_rejected_at_json_boundary() {
        let result: std::result::Result<OccupancyUpdate, _> = serde_json::from_value(json!({
            "bus_id": "B1",
            "route_id": "R1",
            "occupancy_count": -1,
            "max_capacity": 41
        }));

        assert!(result.is_err());
    }

    #[test]
    fn envelope_always_serializes_data_key() {
        let body = serde_json::to_value(ApiResponse::failure("nope")).expect("serializes");
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["success"], json!(false));
    }

    #[test]
    fn push_record_omits_database_error_until_set() {
        let record =
            PushRecord::new(Uuid::new_v4(), json!({"detection_results": []}), None, Utc::now());
        let doc = serde_json::to_value(&record).expect("serializes");

        assert_eq!(doc["processed"], json!(true));
        assert_eq!(doc["metadata"], json!({}));
        assert!(doc.get("database_error").is_none());
    }
}
