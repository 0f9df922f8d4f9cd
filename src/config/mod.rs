//! # Configuration Management
//!
//! Configuration is read from `ROTATOR_*` environment variables (a `.env`
//! file is loaded by the binary first) and validated before use.
//!
//! | Variable                               | Default                |
//! |----------------------------------------|------------------------|
//! | `ROTATOR_ISSUER_BASE_URL`              | `https://api.trakt.tv` |
//! | `ROTATOR_TOKEN_PATH`                   | `/oauth/token`         |
//! | `ROTATOR_PROBE_PATH`                   | `/users/me/lists`      |
//! | `ROTATOR_API_VERSION_HEADER`           | `trakt-api-version`    |
//! | `ROTATOR_API_VERSION`                  | `2`                    |
//! | `ROTATOR_API_KEY_HEADER`               | `trakt-api-key`        |
//! | `ROTATOR_HTTP_TIMEOUT_SECONDS`         | `10`                   |
//! | `ROTATOR_HTTP_CONNECT_TIMEOUT_SECONDS` | `5`                    |
//! | `ROTATOR_STORE_BACKEND`                | `aws`                  |
//! | `ROTATOR_AWS_REGION`                   | SDK default chain      |
//! | `ROTATOR_AWS_ENDPOINT_URL`             | unset                  |
//! | `ROTATOR_MEMORY_SNAPSHOT`              | unset                  |
//! | `ROTATOR_LOG_LEVEL`                    | `info`                 |
//! | `ROTATOR_JSON_LOGGING`                 | `false`                |
//! | `ROTATOR_SERVICE_NAME`                 | `oauth-rotator`        |

pub mod settings;

pub use settings::{ExchangeConfig, ObservabilityConfig, RotatorConfig, StoreBackend, StoreConfig};

use crate::errors::{Result, RotatorError};
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable prefix for all rotator settings
pub const ENV_PREFIX: &str = "ROTATOR_";

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name)).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            RotatorError::config(format!("Invalid {}{}: {}", ENV_PREFIX, name, e))
        }),
        None => Ok(default),
    }
}

impl RotatorConfig {
    /// Create configuration from environment variables, then validate it
    pub fn from_env() -> Result<Self> {
        let defaults = RotatorConfig::default();

        let exchange = ExchangeConfig {
            base_url: env_var("ISSUER_BASE_URL").unwrap_or(defaults.exchange.base_url),
            token_path: env_var("TOKEN_PATH").unwrap_or(defaults.exchange.token_path),
            probe_path: env_var("PROBE_PATH").unwrap_or(defaults.exchange.probe_path),
            api_version_header: env_var("API_VERSION_HEADER")
                .unwrap_or(defaults.exchange.api_version_header),
            api_version: env_var("API_VERSION").unwrap_or(defaults.exchange.api_version),
            api_key_header: env_var("API_KEY_HEADER").unwrap_or(defaults.exchange.api_key_header),
            timeout_seconds: env_parse("HTTP_TIMEOUT_SECONDS", defaults.exchange.timeout_seconds)?,
            connect_timeout_seconds: env_parse(
                "HTTP_CONNECT_TIMEOUT_SECONDS",
                defaults.exchange.connect_timeout_seconds,
            )?,
        };

        let store = StoreConfig {
            backend: env_parse("STORE_BACKEND", defaults.store.backend)?,
            aws: crate::secrets::AwsStoreConfig {
                region: env_var("AWS_REGION"),
                endpoint_url: env_var("AWS_ENDPOINT_URL"),
            },
            memory_snapshot: env_var("MEMORY_SNAPSHOT").map(PathBuf::from),
        };

        let observability = ObservabilityConfig {
            service_name: env_var("SERVICE_NAME").unwrap_or(defaults.observability.service_name),
            log_level: env_var("LOG_LEVEL").unwrap_or(defaults.observability.log_level),
            json_logging: env_parse("JSON_LOGGING", defaults.observability.json_logging)?,
        };

        let config = Self { exchange, store, observability };
        config.validate()?;
        Ok(config)
    }
}
