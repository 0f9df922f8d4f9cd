//! Error types for secret store operations.

use thiserror::Error;

/// Result type for secret store operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while talking to a staged secret store.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// Secret, version, or staged value not found in the backend.
    #[error("Secret not found: {key}")]
    NotFound { key: String },

    /// Failed to connect to the secret store.
    #[error("Backend connection failed: {message}")]
    ConnectionFailed { message: String },

    /// The store refused the caller's credentials.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// A stage label operation was rejected (e.g. moving a stage from a version
    /// that does not hold it).
    #[error("Invalid stage operation on secret '{key}': {reason}")]
    InvalidStage { key: String, reason: String },

    /// A version id was reused with a different payload.
    #[error("Version '{version_id}' of secret '{key}' already holds a different value")]
    VersionConflict { key: String, version_id: String },

    /// The stored payload is not a valid credential document.
    #[error("Invalid secret value: {reason}")]
    InvalidValue { reason: String },

    /// Backend-specific error.
    #[error("Backend error: {message}")]
    BackendError { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SecretsError {
    /// Create a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: message.into() }
    }

    /// Create an authentication failed error.
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed { message: message.into() }
    }

    /// Create an invalid stage error.
    pub fn invalid_stage(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidStage { key: key.into(), reason: reason.into() }
    }

    /// Create a version conflict error.
    pub fn version_conflict(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self::VersionConflict { key: key.into(), version_id: version_id.into() }
    }

    /// Create an invalid value error.
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue { reason: reason.into() }
    }

    /// Create a backend error.
    pub fn backend_error(message: impl Into<String>) -> Self {
        Self::BackendError { message: message.into() }
    }

    /// Whether this error means the requested secret or version does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = SecretsError::not_found("svc/token");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Secret not found: svc/token");

        let err = SecretsError::connection_failed("timeout");
        assert!(matches!(err, SecretsError::ConnectionFailed { .. }));
        assert!(!err.is_not_found());

        let err = SecretsError::invalid_stage("svc/token", "v9 does not hold AWSCURRENT");
        assert!(matches!(err, SecretsError::InvalidStage { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = SecretsError::version_conflict("svc/token", "v2");
        assert!(err.to_string().contains("v2"));
        assert!(err.to_string().contains("svc/token"));
    }
}
