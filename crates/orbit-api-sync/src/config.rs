//! Trigger endpoint configuration.
//!
//! All three values are required whenever the trigger endpoint is mounted;
//! a missing one is a startup error.

use std::net::IpAddr;

/// Access-control settings for the sync trigger endpoint.
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    /// The only client IP allowed to invoke the trigger.
    pub trusted_ip: IpAddr,

    /// Required value of the `x-service-origin` header.
    pub trusted_origin: String,

    /// Shared secret the request body must carry as `password`.
    pub shared_secret: String,
}

impl TriggerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let trusted_ip = reader("SYNC_TRUSTED_IP")
            .map_err(|_| ConfigError::MissingVar("SYNC_TRUSTED_IP".into()))?
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidValue("SYNC_TRUSTED_IP".into(), e.to_string()))?;

        let trusted_origin = reader("SYNC_TRUSTED_ORIGIN")
            .map_err(|_| ConfigError::MissingVar("SYNC_TRUSTED_ORIGIN".into()))?;

        let shared_secret = reader("SYNC_SHARED_SECRET")
            .map_err(|_| ConfigError::MissingVar("SYNC_SHARED_SECRET".into()))?;

        Ok(Self {
            trusted_ip,
            trusted_origin,
            shared_secret,
        })
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
