//! Rotation step errors.

use thiserror::Error;

use crate::exchange::UpstreamError;
use crate::secrets::SecretsError;

/// Why a rotation step refused to proceed.
///
/// Every variant aborts the current step; the orchestrator decides whether to
/// retry the step or abandon the attempt.
#[derive(Error, Debug)]
pub enum RotationError {
    #[error("Secret {secret_id} is not enabled for rotation")]
    RotationNotEnabled { secret_id: String },

    #[error("Secret version {version_id} has no stage for rotation of secret {secret_id}")]
    UnknownVersion { secret_id: String, version_id: String },

    #[error("Secret version {version_id} not set as AWSPENDING for rotation of secret {secret_id}")]
    NotPending { secret_id: String, version_id: String },

    /// The pending version has no credential written yet, so there is nothing to test or promote.
    #[error("Secret version {version_id} of secret {secret_id} holds no pending credential")]
    MissingPendingCredential { secret_id: String, version_id: String },

    /// The issuer refused to trade the current refresh token.
    #[error("Token refresh failed for secret {secret_id}: {source}")]
    UpstreamExchangeFailed {
        secret_id: String,
        #[source]
        source: UpstreamError,
    },

    /// The pending access token did not authenticate against the resource server.
    #[error("Pending credential {version_id} of secret {secret_id} failed validation: {source}")]
    PendingCredentialInvalid {
        secret_id: String,
        version_id: String,
        #[source]
        source: UpstreamError,
    },

    #[error("Secret store error: {0}")]
    Store(#[from] SecretsError),
}

impl RotationError {
    pub fn not_enabled(secret_id: impl Into<String>) -> Self {
        Self::RotationNotEnabled { secret_id: secret_id.into() }
    }

    pub fn unknown_version(secret_id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self::UnknownVersion { secret_id: secret_id.into(), version_id: version_id.into() }
    }

    pub fn not_pending(secret_id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self::NotPending { secret_id: secret_id.into(), version_id: version_id.into() }
    }

    pub fn missing_pending(secret_id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self::MissingPendingCredential { secret_id: secret_id.into(), version_id: version_id.into() }
    }

    pub fn exchange_failed(secret_id: impl Into<String>, source: UpstreamError) -> Self {
        Self::UpstreamExchangeFailed { secret_id: secret_id.into(), source }
    }

    pub fn pending_invalid(
        secret_id: impl Into<String>,
        version_id: impl Into<String>,
        source: UpstreamError,
    ) -> Self {
        Self::PendingCredentialInvalid {
            secret_id: secret_id.into(),
            version_id: version_id.into(),
            source,
        }
    }

    /// The upstream failure behind this error, if any.
    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            Self::UpstreamExchangeFailed { source, .. }
            | Self::PendingCredentialInvalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_messages() {
        assert_eq!(
            RotationError::not_enabled("trakt").to_string(),
            "Secret trakt is not enabled for rotation"
        );
        assert_eq!(
            RotationError::not_pending("trakt", "v2").to_string(),
            "Secret version v2 not set as AWSPENDING for rotation of secret trakt"
        );
    }

    #[test]
    fn test_exchange_failure_carries_upstream_detail() {
        let upstream = UpstreamError::rejected(
            401,
            "Unauthorized",
            Some("invalid_grant".to_string()),
            Some("grant revoked".to_string()),
        );
        let err = RotationError::exchange_failed("trakt", upstream.clone());

        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("invalid_grant: grant revoked"));
        assert_eq!(err.upstream(), Some(&upstream));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_store_error_conversion() {
        let err: RotationError = SecretsError::not_found("trakt").into();
        assert!(matches!(err, RotationError::Store(_)));
        assert!(err.upstream().is_none());
    }
}
