//! The four-step rotation state machine.

use std::sync::Arc;
use tracing::{info, warn, Instrument};

use super::error::RotationError;
use super::request::{RotationRequest, RotationStep};
use super::validation::validate_pending;
use crate::exchange::CredentialExchange;
use crate::secrets::{SecretStore, VersionSelector, VersionStage};

/// Outcome of the checks run before any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precondition {
    /// The request token is `AWSPENDING`; the step should run.
    Proceed,
    /// The request token is already `AWSCURRENT`; nothing to do.
    AlreadyCurrent,
}

/// Drives one secret version from `AWSPENDING` to `AWSCURRENT`.
///
/// Holds no state between calls: every invocation re-reads the secret's stage
/// map, so steps may be replayed in any number and survive process restarts.
#[derive(Clone)]
pub struct RotationStateMachine {
    store: Arc<dyn SecretStore>,
    exchange: Arc<dyn CredentialExchange>,
}

impl RotationStateMachine {
    pub fn new(store: Arc<dyn SecretStore>, exchange: Arc<dyn CredentialExchange>) -> Self {
        Self { store, exchange }
    }

    /// Run one rotation step.
    pub async fn handle(&self, request: &RotationRequest) -> Result<(), RotationError> {
        let span = crate::rotation_span!(
            request.secret_id,
            request.client_request_token,
            request.step
        );
        self.handle_inner(request).instrument(span).await
    }

    async fn handle_inner(&self, request: &RotationRequest) -> Result<(), RotationError> {
        let secret_id = request.secret_id.as_str();
        let token = request.client_request_token.as_str();

        if self.check_preconditions(secret_id, token).await? == Precondition::AlreadyCurrent {
            info!("Version already set as AWSCURRENT, nothing to do");
            return Ok(());
        }

        match &request.step {
            RotationStep::CreateSecret => self.create_secret(secret_id, token).await,
            RotationStep::SetSecret => self.set_secret(secret_id, token).await,
            RotationStep::TestSecret => self.test_secret(secret_id, token).await,
            RotationStep::FinishSecret => self.finish_secret(secret_id, token).await,
            RotationStep::Unrecognized(name) => {
                warn!(step = %name, "Ignoring unrecognized rotation step");
                Ok(())
            }
        }
    }

    async fn check_preconditions(
        &self,
        secret_id: &str,
        token: &str,
    ) -> Result<Precondition, RotationError> {
        let description = self.store.describe(secret_id).await?;

        if !description.rotation_enabled {
            return Err(RotationError::not_enabled(secret_id));
        }

        let Some(stages) = description.versions.stages_of(token) else {
            return Err(RotationError::unknown_version(secret_id, token));
        };

        if stages.contains(&VersionStage::Current) {
            return Ok(Precondition::AlreadyCurrent);
        }

        if !stages.contains(&VersionStage::Pending) {
            return Err(RotationError::not_pending(secret_id, token));
        }

        Ok(Precondition::Proceed)
    }

    /// Exchange the current refresh token and store the new pair as the pending version.
    async fn create_secret(&self, secret_id: &str, token: &str) -> Result<(), RotationError> {
        let pending = VersionSelector::version_in_stage(token, VersionStage::Pending);
        if self.store.find_credential(secret_id, &pending).await?.is_some() {
            // Refreshing again would burn the refresh token the pending payload already holds.
            info!("Pending credential already written, skipping token exchange");
            return Ok(());
        }

        let current = self
            .store
            .get_credential(secret_id, &VersionSelector::stage(VersionStage::Current))
            .await?;

        let tokens = self
            .exchange
            .refresh(&current.refresh_token, &current.client_id, &current.client_secret)
            .await
            .map_err(|e| {
                warn!(status = ?e.status(), error = %e, "Token refresh rejected");
                RotationError::exchange_failed(secret_id, e)
            })?;

        let rotated = current.with_rotated_tokens(tokens.access_token, tokens.refresh_token);
        self.store.put_pending_credential(secret_id, token, &rotated).await?;

        info!("Stored refreshed credential as AWSPENDING");
        Ok(())
    }

    /// The issuer already knows the new tokens; there is nothing to provision.
    async fn set_secret(&self, _secret_id: &str, _token: &str) -> Result<(), RotationError> {
        info!("No downstream system to provision, setSecret is a no-op");
        Ok(())
    }

    async fn test_secret(&self, secret_id: &str, token: &str) -> Result<(), RotationError> {
        validate_pending(self.store.as_ref(), self.exchange.as_ref(), secret_id, token).await
    }

    /// Move `AWSCURRENT` onto the request token.
    async fn finish_secret(&self, secret_id: &str, token: &str) -> Result<(), RotationError> {
        let description = self.store.describe(secret_id).await?;
        let holder = description.versions.version_with_stage(&VersionStage::Current);

        if holder == Some(token) {
            info!("Version already marked as AWSCURRENT");
            return Ok(());
        }

        let pending = VersionSelector::version_in_stage(token, VersionStage::Pending);
        if self.store.find_credential(secret_id, &pending).await?.is_none() {
            warn!("Pending version holds no credential, refusing to promote");
            return Err(RotationError::missing_pending(secret_id, token));
        }

        self.store.move_stage(secret_id, &VersionStage::Current, token, holder).await?;

        info!(previous_version = ?holder, "Promoted version to AWSCURRENT");
        Ok(())
    }
}

impl std::fmt::Debug for RotationStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationStateMachine").finish_non_exhaustive()
    }
}
