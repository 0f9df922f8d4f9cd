//! Pending credential validation.

use tracing::{info, warn};

use super::error::RotationError;
use crate::exchange::{CredentialExchange, UpstreamError};
use crate::secrets::{SecretStore, VersionSelector, VersionStage};

/// Read the `AWSPENDING` credential of `version_id` and make one authenticated
/// request with its access token.
///
/// Any non-200 answer, transport failure or timeout is a
/// [`RotationError::PendingCredentialInvalid`]. A pending version with no
/// credential written is a [`RotationError::MissingPendingCredential`].
pub async fn validate_pending(
    store: &dyn SecretStore,
    exchange: &dyn CredentialExchange,
    secret_id: &str,
    version_id: &str,
) -> Result<(), RotationError> {
    let selector = VersionSelector::version_in_stage(version_id, VersionStage::Pending);
    let Some(pending) = store.find_credential(secret_id, &selector).await? else {
        warn!(secret_id = %secret_id, version_id = %version_id, "No pending credential to validate");
        return Err(RotationError::missing_pending(secret_id, version_id));
    };

    if pending.access_token.is_empty() {
        return Err(RotationError::pending_invalid(
            secret_id,
            version_id,
            UpstreamError::invalid_response("credential probe", "pending credential has no access token"),
        ));
    }

    match exchange.probe(&pending.access_token, &pending.client_id).await {
        Ok(()) => {
            info!(secret_id = %secret_id, version_id = %version_id, "Pending credential accepted by resource server");
            Ok(())
        }
        Err(e) => {
            warn!(
                secret_id = %secret_id,
                version_id = %version_id,
                status = ?e.status(),
                error = %e,
                "Pending credential rejected"
            );
            Err(RotationError::pending_invalid(secret_id, version_id, e))
        }
    }
}
