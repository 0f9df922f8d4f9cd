//! # Observability Infrastructure
//!
//! Structured logging for the rotator. Secrets flowing through the rotator are
//! [`SecretString`](crate::secrets::SecretString)s and redact themselves, so log
//! fields can carry records and errors without leaking tokens.

pub mod logging;

pub use logging::{build_env_filter, build_subscriber, init_logging, log_config_info};

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;

/// Initialize logging and announce the service.
pub fn init_observability(config: &ObservabilityConfig) -> Result<()> {
    init_logging(config)?;

    info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        version = crate::VERSION,
        "Observability initialized successfully"
    );

    Ok(())
}
