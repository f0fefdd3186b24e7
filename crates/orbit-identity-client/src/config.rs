//! Client configuration loaded from environment variables.
//!
//! Loading is fail-fast: the authority host, calling service name and calling
//! sub-service name are required whenever identity integration is enabled,
//! and a missing value is a startup error, never a runtime one.

use std::path::PathBuf;

/// Fixed port the identity authority listens on.
pub const AUTHORITY_PORT: u16 = 50051;

/// Default TTL for cached user records, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Connection settings for the identity authority.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Hostname of the identity authority (port is fixed).
    pub host: String,

    /// Name of the calling service, sent with every request for attribution.
    pub service_name: String,

    /// Name of the calling sub-service.
    pub sub_service_name: String,

    /// Path to the PEM trust-anchor certificate for the TLS channel.
    pub ca_cert_path: PathBuf,

    /// TTL for cached user records in seconds. `0` disables expiry.
    pub cache_ttl_secs: u64,
}

impl AuthorityConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let host = reader("AUTHORITY_HOST")
            .map_err(|_| ConfigError::MissingVar("AUTHORITY_HOST".into()))?;

        let service_name =
            reader("SERVICE_NAME").map_err(|_| ConfigError::MissingVar("SERVICE_NAME".into()))?;

        let sub_service_name = reader("SUB_SERVICE_NAME")
            .map_err(|_| ConfigError::MissingVar("SUB_SERVICE_NAME".into()))?;

        let ca_cert_path = reader("AUTHORITY_CA_CERT")
            .map_err(|_| ConfigError::MissingVar("AUTHORITY_CA_CERT".into()))?
            .into();

        let cache_ttl_secs = match reader("USER_CACHE_TTL_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("USER_CACHE_TTL_SECS".into(), e.to_string())
            })?,
            Err(_) => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            host,
            service_name,
            sub_service_name,
            ca_cert_path,
            cache_ttl_secs,
        })
    }

    /// The full endpoint URI of the authority.
    #[must_use]
    pub fn endpoint_uri(&self) -> String {
        format!("https://{}:{}", self.host, AUTHORITY_PORT)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
