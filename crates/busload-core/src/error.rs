//! Error types and result handling for domain operations.
//!
//! Covers the semantic checks the JSON shape cannot express. Transport and
//! storage failures have their own taxonomies in the crates that own those
//! concerns.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for domain-level failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input parsed as JSON but violated a semantic constraint.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    /// Creates an `InvalidInput` error from any printable message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
