//! HTTP surface of the bus occupancy gateway.
//!
//! Wires configuration, bearer authentication, and the request handlers
//! into an Axum router. Push payloads are persisted through
//! `busload-store` and forwarded downstream through `busload-webhook`;
//! every response is wrapped in the uniform envelope from
//! `busload-core`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use config::{Config, Environment};
pub use error::ApiError;
pub use server::{create_router, start_server};

use std::sync::Arc;

use anyhow::Context;
use busload_store::StoreClient;
use busload_webhook::Notifier;

/// Shared application state injected into every handler.
///
/// Built once at startup and cheap to clone: both HTTP clients pool
/// their connections internally and the configuration is
/// reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Immutable service configuration.
    pub config: Arc<Config>,
    /// Gateway to the managed JSON store.
    pub store: StoreClient,
    /// Best-effort downstream notifier.
    pub notifier: Notifier,
}

impl AppState {
    /// Builds the shared state from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when either HTTP client cannot be constructed.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let store =
            StoreClient::new(config.to_store_config()).context("Failed to build store client")?;
        let notifier = Notifier::new(config.to_notifier_config())
            .context("Failed to build webhook notifier")?;

        Ok(Self { config: Arc::new(config), store, notifier })
    }
}
