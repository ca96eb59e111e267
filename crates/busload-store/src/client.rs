//! HTTP client for the managed JSON store.
//!
//! Handles request construction, response decoding, and error
//! classification for the store's REST dialect. One pooled client is built
//! at startup and shared across requests.

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::error::{Result, StoreError};

/// Configuration for the store client.
#[derive(Clone)]
pub struct StoreConfig {
    /// Base URL of the managed store, without the `/rest/v1` suffix.
    pub base_url: String,
    /// Service key, sent as both the `apikey` header and bearer credential.
    pub api_key: String,
    /// Timeout applied to every store request.
    pub timeout: Duration,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// One persisted row as the store returns it.
///
/// The caller-supplied document always lives under `json_data`; `id` and
/// `created_at` are assigned by the store on insert. `created_at` is the
/// tiebreaker for "latest wins" reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRow {
    /// Server-assigned row identifier.
    pub id: i64,
    /// Server-assigned insertion time.
    pub created_at: DateTime<Utc>,
    /// The document exactly as it was inserted.
    pub json_data: Value,
}

/// HTTP gateway to the managed JSON store.
///
/// Uses connection pooling and a per-request timeout so a stalled store
/// cannot hold a request slot indefinitely. Classifies failures into the
/// `StoreError` taxonomy; what to do about them is the caller's decision.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: reqwest::Client,
    config: StoreConfig,
}

impl StoreClient {
    /// Creates a new store client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Configuration` if the HTTP client cannot be
    /// built with the provided settings.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("busload/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                StoreError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Inserts one document into `table` and returns the stored row.
    ///
    /// The document is wrapped under the `json_data` column and the store
    /// is asked to echo the representation back, so the server-assigned
    /// `id` and `created_at` are available to the caller immediately.
    ///
    /// # Errors
    ///
    /// Returns `Unreachable` or `Timeout` for transport failures,
    /// `Rejected` when the store refuses our credentials, `Failed` for any
    /// other non-success status, and `Malformed` when the response body is
    /// not a row array.
    pub async fn insert(&self, table: &str, document: &Value) -> Result<StoredRow> {
        let span = info_span!("store_insert", table = %table);

        async move {
            let start_time = std::time::Instant::now();

            let response = self
                .client
                .post(self.table_url(table))
                .header("apikey", &self.config.api_key)
                .bearer_auth(&self.config.api_key)
                .header("Prefer", "return=representation")
                .json(&serde_json::json!([{ "json_data": document }]))
                .send()
                .await
                .map_err(|e| self.transport_error(e, start_time.elapsed()))?;

            let status = response.status();
            let duration = start_time.elapsed();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    status = status.as_u16(),
                    duration_ms = duration.as_millis(),
                    "Store rejected insert"
                );
                return Err(classify_status(status.as_u16(), body));
            }

            let rows: Vec<StoredRow> = response
                .json()
                .await
                .map_err(|e| StoreError::malformed(format!("insert response: {e}")))?;

            tracing::debug!(duration_ms = duration.as_millis(), "Document stored");

            rows.into_iter()
                .next()
                .ok_or_else(|| StoreError::malformed("insert returned no representation"))
        }
        .instrument(span)
        .await
    }

    /// Fetches every row of `table`.
    ///
    /// There is no server-side filtering; callers scan in memory. The
    /// tables involved stay small enough that a full scan is the simplest
    /// correct read.
    ///
    /// # Errors
    ///
    /// Same classification as [`StoreClient::insert`].
    pub async fn fetch_all(&self, table: &str) -> Result<Vec<StoredRow>> {
        let span = info_span!("store_scan", table = %table);

        async move {
            let start_time = std::time::Instant::now();

            let response = self
                .client
                .get(self.table_url(table))
                .query(&[("select", "*")])
                .header("apikey", &self.config.api_key)
                .bearer_auth(&self.config.api_key)
                .send()
                .await
                .map_err(|e| self.transport_error(e, start_time.elapsed()))?;

            let status = response.status();
            let duration = start_time.elapsed();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    status = status.as_u16(),
                    duration_ms = duration.as_millis(),
                    "Store rejected scan"
                );
                return Err(classify_status(status.as_u16(), body));
            }

            let rows: Vec<StoredRow> = response
                .json()
                .await
                .map_err(|e| StoreError::malformed(format!("scan response: {e}")))?;

            tracing::debug!(
                rows = rows.len(),
                duration_ms = duration.as_millis(),
                "Table scanned"
            );

            Ok(rows)
        }
        .instrument(span)
        .await
    }

    /// Checks that the store is reachable and accepts our credentials.
    ///
    /// Any answered request proves liveness, so every status short of a
    /// credential rejection counts as success. Some deployments answer the
    /// REST root with 404, which still demonstrates reachability.
    ///
    /// # Errors
    ///
    /// Returns `Unreachable` or `Timeout` when the store cannot be
    /// reached, and `Rejected` when it answers 401 or 403.
    pub async fn probe(&self) -> Result<()> {
        let start_time = std::time::Instant::now();

        let response = self
            .client
            .get(format!("{}/rest/v1/", self.base_url()))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(e, start_time.elapsed()))?;

        let status = response.status().as_u16();
        match status {
            401 | 403 => {
                tracing::warn!(status, "Store probe rejected");
                Err(StoreError::rejected(status))
            },
            _ => {
                tracing::debug!(
                    status,
                    duration_ms = start_time.elapsed().as_millis(),
                    "Store probe answered"
                );
                Ok(())
            },
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url(), table)
    }

    fn transport_error(&self, error: reqwest::Error, duration: Duration) -> StoreError {
        tracing::warn!(duration_ms = duration.as_millis(), "Store request failed: {}", error);

        if error.is_timeout() {
            return StoreError::timeout(self.config.timeout.as_secs());
        }
        if error.is_connect() {
            return StoreError::unreachable(format!("connection failed: {error}"));
        }
        StoreError::unreachable(error.to_string())
    }
}

/// Maps a non-success HTTP status to the store error taxonomy.
fn classify_status(status_code: u16, body: String) -> StoreError {
    match status_code {
        401 | 403 => StoreError::rejected(status_code),
        _ => StoreError::failed(status_code, body),
    }
}
