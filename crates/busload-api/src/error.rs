//! Error types for the HTTP surface.
//!
//! Every handler failure funnels through [`ApiError`], which renders
//! itself as the uniform response envelope so callers never see a bare
//! framework error body.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use busload_core::{ApiResponse, CoreError};
use busload_store::StoreError;
use thiserror::Error;

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bearer credentials were missing, malformed, or wrong.
    ///
    /// All three cases answer identically so a caller probing the
    /// gateway cannot tell a bad token from an absent one.
    #[error("Invalid bearer token")]
    Authentication,

    /// The request parsed as JSON but failed semantic validation.
    #[error("Validation error")]
    Validation {
        /// What was wrong, echoed to the caller under `data.detail`.
        detail: String,
    },

    /// The managed store failed an operation this endpoint cannot absorb.
    #[error("{message}")]
    Storage {
        /// Caller-facing description of the failure.
        message: String,
        /// What the store reported.
        #[source]
        source: StoreError,
    },

    /// The requested entity does not exist.
    #[error("{message}")]
    NotFound {
        /// Caller-facing description of what was not found.
        message: String,
    },

    /// Anything the handler did not anticipate.
    #[error("Failed to process request: {message}")]
    Unexpected {
        /// Description of the unanticipated failure.
        message: String,
    },
}

impl ApiError {
    /// Creates a validation error with the given detail.
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation { detail: detail.into() }
    }

    /// Creates a storage error with a caller-facing message.
    pub fn storage(message: impl Into<String>, source: StoreError) -> Self {
        Self::Storage { message: message.into(), source }
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Creates an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected { message: message.into() }
    }

    /// HTTP status this error answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Storage { .. } | Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidInput(detail) => Self::Validation { detail },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Unexpected { message: error.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::Validation { detail } => ApiResponse::failure_with_data(
                self.to_string(),
                serde_json::json!({ "detail": detail }),
            ),
            _ => ApiResponse::failure(self.to_string()),
        };

        let mut response = (status, Json(body)).into_response();

        if matches!(self, Self::Authentication) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
