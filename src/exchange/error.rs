//! Upstream (issuer / resource server) error types.

use thiserror::Error;

/// Why a call to the credential issuer or the protected resource failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("HTTP {status} {reason}{}", describe_detail(.error, .description))]
    Rejected {
        status: u16,
        reason: String,
        /// OAuth `error` code, when the body carried one.
        error: Option<String>,
        /// OAuth `error_description`, when the body carried one.
        description: Option<String>,
    },

    /// No response within the configured timeout.
    #[error("{operation} timed out")]
    Timeout { operation: String },

    /// Connection, TLS or protocol failure before a status was received.
    #[error("{operation} failed: {message}")]
    Transport { operation: String, message: String },

    /// A success status with a body we could not use.
    #[error("{operation} returned an invalid response: {message}")]
    InvalidResponse { operation: String, message: String },
}

fn describe_detail(error: &Option<String>, description: &Option<String>) -> String {
    match (error, description) {
        (Some(error), Some(description)) => format!(". {}: {}", error, description),
        (Some(error), None) => format!(". {}", error),
        (None, Some(description)) => format!(". {}", description),
        (None, None) => String::new(),
    }
}

impl UpstreamError {
    /// Create a rejected-status error.
    pub fn rejected(
        status: u16,
        reason: impl Into<String>,
        error: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self::Rejected { status, reason: reason.into(), error, description }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout { operation: operation.into() }
    }

    /// Create a transport error.
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport { operation: operation.into(), message: message.into() }
    }

    /// Create an invalid response error.
    pub fn invalid_response(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse { operation: operation.into(), message: message.into() }
    }

    /// HTTP status returned by the upstream, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
