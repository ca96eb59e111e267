//! Error types for managed-store operations.
//!
//! Classifies transport failures, credential rejections, and malformed
//! responses separately so callers can apply their own failure policy:
//! the health probe maps connectivity loss to a degraded report while a
//! credential rejection is fatal, and the write paths each decide whether
//! a failure is soft or hard.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for calls against the managed store's REST interface.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Network-level connectivity failure.
    #[error("store unreachable: {message}")]
    Unreachable {
        /// Error message describing the transport failure
        message: String,
    },

    /// Request timeout exceeded.
    #[error("store request timed out after {timeout_seconds}s")]
    Timeout {
        /// Number of seconds before the request timed out
        timeout_seconds: u64,
    },

    /// The store rejected our credentials.
    #[error("store rejected credentials: HTTP {status_code}")]
    Rejected {
        /// HTTP status code (401 or 403)
        status_code: u16,
    },

    /// The store answered a data call with a non-success status.
    #[error("store request failed: HTTP {status_code}")]
    Failed {
        /// HTTP status code returned by the store
        status_code: u16,
        /// Response body content
        body: String,
    },

    /// The store answered with a body that does not match the row shape.
    #[error("store response malformed: {message}")]
    Malformed {
        /// Description of the decoding failure
        message: String,
    },

    /// Client could not be constructed from the configuration.
    #[error("store configuration invalid: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl StoreError {
    /// Creates an unreachable error from a message.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates a credential rejection error.
    pub fn rejected(status_code: u16) -> Self {
        Self::Rejected { status_code }
    }

    /// Creates a failed-call error from an HTTP response.
    pub fn failed(status_code: u16, body: impl Into<String>) -> Self {
        Self::Failed { status_code, body: body.into() }
    }

    /// Creates a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed { message: message.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Whether this error means the store could not be reached at all.
    ///
    /// Connectivity loss is survivable (the service keeps answering in a
    /// degraded mode), whereas a credential rejection means every future
    /// call will fail the same way until the configuration changes.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }
}
