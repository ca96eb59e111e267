//! Notification dispatch with timeout isolation.
//!
//! Builds the downstream envelope, sends it, and classifies the outcome.
//! Nothing here returns a `Result`: a notification that cannot be
//! delivered is an observability event, not a request failure.

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info_span, Instrument};

use crate::NEW_DETECTION_EVENT;

/// Configuration for the webhook notifier.
#[derive(Clone)]
pub struct NotifierConfig {
    /// Destination URL. An empty string disables dispatch entirely.
    pub url: String,
    /// Shared secret included in every envelope so the consumer can check
    /// provenance.
    pub secret: String,
    /// Timeout for the single delivery attempt.
    pub timeout: Duration,
}

impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("url", &self.url)
            .field("secret", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Payload POSTed to the downstream consumer for each stored record.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEnvelope {
    /// Event discriminator, always [`NEW_DETECTION_EVENT`] today.
    pub event: &'static str,
    /// Store-assigned row id of the record that triggered the event.
    pub record_id: i64,
    /// The normalized detection document, with the record uuid folded in.
    pub data: Value,
    /// When the notification was produced.
    pub timestamp: DateTime<Utc>,
    /// Shared secret for the consumer's provenance check.
    pub secret: String,
}

/// How a single notification attempt ended.
///
/// Returned for observability and tests; callers never branch on it to
/// fail a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Consumer answered with a success status.
    Delivered {
        /// HTTP status code returned by the consumer
        status: u16,
    },
    /// Consumer answered with a non-success status.
    Rejected {
        /// HTTP status code returned by the consumer
        status: u16,
    },
    /// The attempt exceeded the configured timeout.
    TimedOut,
    /// The consumer could not be reached at all.
    TransportFailed,
}

impl DispatchOutcome {
    /// Whether the consumer acknowledged the notification.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Best-effort notifier for the downstream frontend.
///
/// Owns one pooled client whose timeout caps every attempt, so a stalled
/// consumer self-aborts without any cancellation plumbing.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    config: NotifierConfig,
}

impl Notifier {
    /// Creates a notifier with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns the underlying builder error when the HTTP client cannot
    /// be constructed.
    pub fn new(config: NotifierConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("busload/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Whether dispatch is configured at all.
    pub fn enabled(&self) -> bool {
        !self.config.url.is_empty()
    }

    /// Sends one notification and classifies the outcome.
    ///
    /// Logs every outcome with the elapsed duration: delivered at info,
    /// a non-success answer at warn, timeouts and transport failures at
    /// error. Never returns an error and never panics on failure.
    pub async fn notify(&self, record_id: i64, data: Value) -> DispatchOutcome {
        let span = info_span!("webhook_notify", record_id);

        async move {
            let start_time = std::time::Instant::now();

            let envelope = NotificationEnvelope {
                event: NEW_DETECTION_EVENT,
                record_id,
                data,
                timestamp: Utc::now(),
                secret: self.config.secret.clone(),
            };

            let result = self.client.post(&self.config.url).json(&envelope).send().await;
            let duration = start_time.elapsed();

            match result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if response.status().is_success() {
                        tracing::info!(
                            status,
                            duration_ms = duration.as_millis(),
                            "Webhook delivered"
                        );
                        DispatchOutcome::Delivered { status }
                    } else {
                        tracing::warn!(
                            status,
                            duration_ms = duration.as_millis(),
                            "Webhook rejected"
                        );
                        DispatchOutcome::Rejected { status }
                    }
                },
                Err(e) if e.is_timeout() => {
                    tracing::error!(
                        duration_ms = duration.as_millis(),
                        "Webhook timed out: {}",
                        e
                    );
                    DispatchOutcome::TimedOut
                },
                Err(e) => {
                    tracing::error!(duration_ms = duration.as_millis(), "Webhook failed: {}", e);
                    DispatchOutcome::TransportFailed
                },
            }
        }
        .instrument(span)
        .await
    }

    /// Dispatches a notification without waiting for it.
    ///
    /// The attempt runs on its own task, so handler latency is independent
    /// of consumer latency and a dispatch panic cannot reach the caller.
    /// Skipped with a debug log when no destination URL is configured.
    pub fn spawn_notify(&self, record_id: i64, data: Value) {
        if !self.enabled() {
            tracing::debug!(record_id, "Webhook dispatch disabled, skipping");
            return;
        }

        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify(record_id, data).await;
        });
    }
}
