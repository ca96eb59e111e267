//! Core domain models for the bus occupancy gateway.
//!
//! Provides the uniform response envelope, the semi-structured push payload,
//! and the persisted record types shared by the HTTP surface, the store
//! gateway, and the webhook notifier.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;

pub use error::{CoreError, Result};
pub use models::{ApiResponse, OccupancyRecord, OccupancyUpdate, PushPayload, PushRecord};
