//! # Error Handling
//!
//! Crate-level error type for configuration and startup. Rotation steps report
//! [`RotationError`](crate::rotation::RotationError) instead; the CLI folds both
//! into `anyhow`.

/// Custom result type for rotator operations
pub type Result<T> = std::result::Result<T, RotatorError>;

/// Main error type for the rotator
#[derive(thiserror::Error, Debug)]
pub enum RotatorError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RotatorError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into() }
    }
}

impl From<validator::ValidationErrors> for RotatorError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::validation(format!("Validation failed: {}", errors))
    }
}
