//! # Configuration Settings
//!
//! Defines the configuration structure for the rotator.

use crate::errors::{Result, RotatorError};
use crate::secrets::AwsStoreConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

/// Main rotator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct RotatorConfig {
    /// Upstream issuer / resource server configuration
    #[validate(nested)]
    pub exchange: ExchangeConfig,

    /// Secret store configuration
    pub store: StoreConfig,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl RotatorConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(RotatorError::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Checks the validator crate can't express
    fn validate_custom(&self) -> Result<()> {
        let base = url::Url::parse(&self.exchange.base_url).map_err(|e| {
            RotatorError::validation_field(format!("Invalid issuer base URL: {}", e), "base_url")
        })?;
        if base.cannot_be_a_base() {
            return Err(RotatorError::validation_field(
                "Issuer base URL must be an absolute http(s) URL",
                "base_url",
            ));
        }

        for (field, value) in
            [("token_path", &self.exchange.token_path), ("probe_path", &self.exchange.probe_path)]
        {
            if !value.starts_with('/') {
                return Err(RotatorError::validation_field(
                    format!("{} must start with '/'", field),
                    field,
                ));
            }
        }

        for (field, value) in [
            ("api_version_header", &self.exchange.api_version_header),
            ("api_key_header", &self.exchange.api_key_header),
        ] {
            if reqwest::header::HeaderName::from_str(value).is_err() {
                return Err(RotatorError::validation_field(
                    format!("{} is not a valid HTTP header name", field),
                    field,
                ));
            }
        }

        if self.exchange.connect_timeout_seconds > self.exchange.timeout_seconds {
            return Err(RotatorError::validation(
                "Connect timeout cannot exceed the request timeout",
            ));
        }

        if self.store.backend == StoreBackend::Memory && self.store.memory_snapshot.is_none() {
            return Err(RotatorError::validation_field(
                "The memory store needs a snapshot file",
                "memory_snapshot",
            ));
        }

        Ok(())
    }
}

/// Upstream credential issuer and protected resource
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExchangeConfig {
    /// Base URL shared by the token endpoint and the probe endpoint
    #[validate(url(message = "Issuer base URL must be a valid URL"))]
    pub base_url: String,

    /// Path of the OAuth token endpoint
    #[validate(length(min = 1, message = "Token path cannot be empty"))]
    pub token_path: String,

    /// Path of the protected resource used to validate a pending credential
    #[validate(length(min = 1, message = "Probe path cannot be empty"))]
    pub probe_path: String,

    /// Header carrying the API version on probe requests
    #[validate(length(min = 1, message = "API version header cannot be empty"))]
    pub api_version_header: String,

    /// API version value sent on probe requests
    #[validate(length(min = 1, message = "API version cannot be empty"))]
    pub api_version: String,

    /// Header carrying the client id on probe requests
    #[validate(length(min = 1, message = "API key header cannot be empty"))]
    pub api_key_header: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 120, message = "Timeout must be between 1 and 120 seconds"))]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.trakt.tv".to_string(),
            token_path: "/oauth/token".to_string(),
            probe_path: "/users/me/lists".to_string(),
            api_version_header: "trakt-api-version".to_string(),
            api_version: "2".to_string(),
            api_key_header: "trakt-api-key".to_string(),
            timeout_seconds: 10,
            connect_timeout_seconds: 5,
        }
    }
}

impl ExchangeConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Which secret store backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// AWS Secrets Manager (requires the `aws` feature)
    #[default]
    Aws,
    /// In-memory store seeded from a snapshot file
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = RotatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "memory" => Ok(Self::Memory),
            other => Err(RotatorError::config(format!("Unknown store backend: {}", other))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// AWS connection settings, used by the `aws` backend
    pub aws: AwsStoreConfig,

    /// Snapshot file seeding the `memory` backend
    pub memory_snapshot: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "oauth-rotator".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RotatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.exchange.timeout(), Duration::from_secs(10));
        assert_eq!(config.store.backend, StoreBackend::Aws);
    }

    #[test]
    fn test_rejects_relative_paths() {
        let mut config = RotatorConfig::default();
        config.exchange.token_path = "oauth/token".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token_path"));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = RotatorConfig::default();
        config.exchange.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_timeout() {
        let mut config = RotatorConfig::default();
        config.exchange.timeout_seconds = 0;
        assert!(matches!(config.validate(), Err(RotatorError::Validation { .. })));
    }

    #[test]
    fn test_rejects_invalid_header_name() {
        let mut config = RotatorConfig::default();
        config.exchange.api_key_header = "bad header".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_backend_requires_snapshot() {
        let mut config = RotatorConfig::default();
        config.store.backend = StoreBackend::Memory;
        assert!(config.validate().is_err());

        config.store.memory_snapshot = Some(PathBuf::from("secrets.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("aws".parse::<StoreBackend>().unwrap(), StoreBackend::Aws);
        assert_eq!("MEMORY".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("vault".parse::<StoreBackend>().is_err());
        assert_eq!(StoreBackend::Memory.to_string(), "memory");
    }
}
