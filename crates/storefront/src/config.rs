//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Storage
//! - `STOREFRONT_BACKEND` - `file` (default) or `postgres`
//! - `STOREFRONT_DATA_DIR` - Directory for JSON collections (default: data)
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string, required
//!   for the `postgres` backend (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 8080)
//! - `STOREFRONT_EVENT_CAPACITY` - Buffered live events per listener (default: 64)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the product and cart collections are persisted.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// One JSON file per collection under `data_dir`.
    File { data_dir: PathBuf },
    /// JSONB documents in `PostgreSQL`.
    Postgres { database_url: SecretString },
}

impl StorageBackend {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Postgres { .. } => "postgres",
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Storage backend for both collections
    pub backend: StorageBackend,
    /// Per-listener buffer of the live event channel
    pub event_capacity: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or the `postgres`
    /// backend is selected without a database URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("STOREFRONT_PORT", "8080")?;
        let event_capacity =
            parse_env_or_default("STOREFRONT_EVENT_CAPACITY", &DEFAULT_EVENT_CAPACITY.to_string())?;
        let backend = storage_backend_from_env()?;

        Ok(Self {
            host,
            port,
            backend,
            event_capacity,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for a file-backed storefront in `data_dir`, with every
    /// other setting at its default.
    #[must_use]
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            backend: StorageBackend::File {
                data_dir: data_dir.into(),
            },
            event_capacity: DEFAULT_EVENT_CAPACITY,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read the storage backend selection.
///
/// # Errors
///
/// Returns `ConfigError` for an unknown backend name or a missing database
/// URL.
pub fn storage_backend_from_env() -> Result<StorageBackend, ConfigError> {
    let backend = get_env_or_default("STOREFRONT_BACKEND", "file");
    match backend.to_ascii_lowercase().as_str() {
        "file" => Ok(StorageBackend::File {
            data_dir: PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", "data")),
        }),
        "postgres" => Ok(StorageBackend::Postgres {
            database_url: get_database_url("STOREFRONT_DATABASE_URL")?,
        }),
        other => Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_BACKEND".to_string(),
            format!("unknown backend {other:?} (expected file or postgres)"),
        )),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither variable is set.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
