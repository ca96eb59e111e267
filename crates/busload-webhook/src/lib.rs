//! Best-effort webhook notifications to the downstream frontend.
//!
//! One POST per stored detection record, with a short timeout and no
//! retries. Delivery is advisory: every outcome is logged with its elapsed
//! duration and reported as a value, never as an error, so the ingestion
//! path can neither fail nor stall because a consumer is slow.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod notifier;

pub use notifier::{DispatchOutcome, NotificationEnvelope, Notifier, NotifierConfig};

/// Event name announced for freshly stored detection data.
pub const NEW_DETECTION_EVENT: &str = "new_detection_data";

/// Default timeout for a notification attempt, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1500;
