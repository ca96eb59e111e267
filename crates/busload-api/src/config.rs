//! Configuration management for the bus occupancy gateway.

use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use busload_store::StoreConfig;
use busload_webhook::NotifierConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "busload.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`busload.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The gateway ships no usable credentials: deployments must supply
/// `DATABASE_URL`, `DATABASE_KEY`, and `BEARER_TOKEN` or loading fails
/// validation.
///
/// # Example
///
/// ```no_run
/// use busload_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    // Store
    /// Base URL of the managed JSON store, without the `/rest/v1` suffix.
    ///
    /// Environment variable: `DATABASE_URL`
    #[serde(default = "default_database_url", alias = "DATABASE_URL")]
    pub database_url: String,
    /// Service API key for the managed store.
    ///
    /// Environment variable: `DATABASE_KEY`
    #[serde(default = "default_database_key", alias = "DATABASE_KEY")]
    pub database_key: String,
    /// Store request timeout in milliseconds.
    ///
    /// Environment variable: `STORE_TIMEOUT_MS`
    #[serde(default = "default_store_timeout_ms", alias = "STORE_TIMEOUT_MS")]
    pub store_timeout_ms: u64,

    // Authentication
    /// Static bearer token that protects the `/api/v1` routes.
    ///
    /// Environment variable: `BEARER_TOKEN`
    #[serde(default = "default_bearer_token", alias = "BEARER_TOKEN")]
    pub bearer_token: String,

    // Webhook
    /// Downstream webhook consumer URL. Empty disables dispatch.
    ///
    /// Environment variable: `WEBHOOK_URL`
    #[serde(default = "default_webhook_url", alias = "WEBHOOK_URL")]
    pub webhook_url: String,
    /// Shared secret embedded in every webhook notification body.
    ///
    /// Environment variable: `WEBHOOK_SECRET`
    #[serde(default = "default_webhook_secret", alias = "WEBHOOK_SECRET")]
    pub webhook_secret: String,
    /// Webhook delivery timeout in milliseconds.
    ///
    /// Environment variable: `WEBHOOK_TIMEOUT_MS`
    #[serde(default = "default_webhook_timeout_ms", alias = "WEBHOOK_TIMEOUT_MS")]
    pub webhook_timeout_ms: u64,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Deployment
    /// Deployment environment. Controls startup logging verbosity and is
    /// echoed by the root endpoint.
    ///
    /// Environment variable: `ENVIRONMENT`
    #[serde(default = "default_environment", alias = "ENVIRONMENT")]
    pub environment: Environment,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

/// Deployment environment the gateway reports and logs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development. Startup logs include masked credentials.
    Development,
    /// Production deployment. Startup logging stays terse.
    Production,
}

impl Environment {
    /// Whether this is a development deployment.
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    /// variable overrides.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (e.g., `DATABASE_URL`, `PORT`)
    /// 2. Configuration file (`busload.toml`)
    /// 3. Built-in defaults
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be parsed or when validation rejects
    /// the merged result.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the store crate's client configuration.
    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            base_url: self.database_url.clone(),
            api_key: self.database_key.clone(),
            timeout: Duration::from_millis(self.store_timeout_ms),
        }
    }

    /// Convert to the webhook crate's notifier configuration.
    pub fn to_notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            url: self.webhook_url.clone(),
            secret: self.webhook_secret.clone(),
            timeout: Duration::from_millis(self.webhook_timeout_ms),
        }
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Store API key reduced to a loggable prefix.
    pub fn database_key_masked(&self) -> String {
        mask_secret(&self.database_key)
    }

    /// Bearer token reduced to a loggable prefix.
    pub fn bearer_token_masked(&self) -> String {
        mask_secret(&self.bearer_token)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("DATABASE_URL must be set");
        }

        if !self.database_url.starts_with("http://") && !self.database_url.starts_with("https://") {
            anyhow::bail!("DATABASE_URL must be an HTTP(S) URL");
        }

        if self.database_key.is_empty() {
            anyhow::bail!("DATABASE_KEY must be set");
        }

        if self.bearer_token.is_empty() {
            anyhow::bail!("BEARER_TOKEN must be set");
        }

        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.store_timeout_ms == 0 {
            anyhow::bail!("store_timeout_ms must be greater than 0");
        }

        if self.webhook_timeout_ms == 0 {
            anyhow::bail!("webhook_timeout_ms must be greater than 0");
        }

        if !self.webhook_url.is_empty()
            && !self.webhook_url.starts_with("http://")
            && !self.webhook_url.starts_with("https://")
        {
            anyhow::bail!("WEBHOOK_URL must be an HTTP(S) URL when set");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            database_key: default_database_key(),
            store_timeout_ms: default_store_timeout_ms(),
            bearer_token: default_bearer_token(),
            webhook_url: default_webhook_url(),
            webhook_secret: default_webhook_secret(),
            webhook_timeout_ms: default_webhook_timeout_ms(),
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            environment: default_environment(),
            rust_log: default_log_level(),
        }
    }
}

// Secrets never appear in Debug output, only their loggable prefixes.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("database_key", &self.database_key_masked())
            .field("store_timeout_ms", &self.store_timeout_ms)
            .field("bearer_token", &self.bearer_token_masked())
            .field("webhook_url", &self.webhook_url)
            .field("webhook_secret", &mask_secret(&self.webhook_secret))
            .field("webhook_timeout_ms", &self.webhook_timeout_ms)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("environment", &self.environment)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn mask_secret(value: &str) -> String {
    if value.chars().count() <= 8 {
        return "***".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    format!("{prefix}***")
}

fn default_database_url() -> String {
    String::new()
}

fn default_database_key() -> String {
    String::new()
}

fn default_store_timeout_ms() -> u64 {
    5000
}

fn default_bearer_token() -> String {
    String::new()
}

fn default_webhook_url() -> String {
    String::new()
}

fn default_webhook_secret() -> String {
    String::new()
}

fn default_webhook_timeout_ms() -> u64 {
    busload_webhook::DEFAULT_TIMEOUT_MS
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info".to_string()
}
