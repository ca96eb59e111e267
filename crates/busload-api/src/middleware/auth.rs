//! Static bearer token authentication middleware.
//!
//! Validates the `Authorization` header against the configured gateway
//! secret using a constant-time comparison. Missing, malformed, and
//! wrong credentials all produce the same 401 challenge.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{error::ApiError, AppState};

/// Extracts the bearer token from the Authorization header.
/// Supports the format: "Bearer <token>"
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(String::from)
}

/// Timing-safe string comparison to prevent timing attacks.
///
/// Uses constant-time comparison to avoid leaking information
/// about the expected token through timing analysis.
fn timing_safe_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut result = 0u8;
    for (a_byte, b_byte) in a_bytes.iter().zip(b_bytes.iter()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}

/// Reduces an attempted token to a prefix safe for log output.
fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}...")
}

/// Axum middleware that authenticates requests against the static
/// bearer secret.
///
/// Only a masked prefix of the attempted token ever reaches the logs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer_token(req.headers()) else {
        warn!("Request without bearer credentials");
        return Err(ApiError::Authentication);
    };

    if !timing_safe_eq(&token, &state.config.bearer_token) {
        warn!(token_prefix = %token_preview(&token), "Rejected invalid bearer token");
        return Err(ApiError::Authentication);
    }

    debug!("Bearer token accepted");
    Ok(next.run(req).await)
}
