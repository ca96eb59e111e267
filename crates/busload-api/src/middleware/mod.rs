//! HTTP middleware for request authentication.
//!
//! Provides static bearer token authentication for the protected
//! `/api/v1` routes.
pub mod auth;
