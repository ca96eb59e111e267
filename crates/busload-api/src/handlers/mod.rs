//! HTTP request handlers for the gateway endpoints.
//!
//! All handlers answer in the uniform response envelope and perform at
//! most one store call per request. Failure policy is endpoint-specific:
//! `/api/v1/push` absorbs storage failures so producers never retry,
//! while `/api/v1/bus-occupancy` refuses to acknowledge data it could
//! not persist.

pub mod health;
pub mod info;
pub mod occupancy;
pub mod push;

pub use health::health_check;
pub use info::service_info;
pub use occupancy::{get_bus_occupancy, update_bus_occupancy};
pub use push::push_data;
