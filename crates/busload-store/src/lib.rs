//! HTTP gateway to the managed JSON store.
//!
//! This crate owns the data-access layer: a thin client over the store's
//! REST interface with one row shape and three operations (insert, full
//! scan, liveness probe). Documents are stored as-is under a `json_data`
//! column; `id` and `created_at` are assigned server-side.
//!
//! Failure policy lives with the callers. Some endpoints degrade
//! gracefully when the store is down and others refuse to answer, so this
//! crate only classifies what happened and reports it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;

pub use client::{StoreClient, StoreConfig, StoredRow};
pub use error::{Result, StoreError};

/// Table holding raw push request documents.
pub const PUSH_TABLE: &str = "push_requests";

/// Table holding bus occupancy snapshots.
pub const OCCUPANCY_TABLE: &str = "bus_occupancy";
