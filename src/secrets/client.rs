//! The staged secret store trait.

use async_trait::async_trait;

use super::credential::CredentialRecord;
use super::error::Result;
use super::types::{SecretDescription, VersionSelector, VersionStage};

/// A versioned key-value secret backend with stage labels.
///
/// Each operation is individually atomic; callers must not assume any
/// transaction spanning two calls. The rotation state machine re-reads the
/// stage map whenever it needs a consistent view.
///
/// # Security Considerations
///
/// - Implementations MUST NOT log credential values
/// - Errors MUST NOT embed the stored payload
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Rotation flag and version-to-stages map of a secret.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::NotFound`](super::SecretsError::NotFound) if the secret doesn't exist
    async fn describe(&self, secret_id: &str) -> Result<SecretDescription>;

    /// Read and decode the credential held by the selected version.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::NotFound`](super::SecretsError::NotFound) if no version
    ///   matches the selector or the version carries no value yet
    /// - [`SecretsError::InvalidValue`](super::SecretsError::InvalidValue) if the
    ///   payload is not a credential document
    async fn get_credential(
        &self,
        secret_id: &str,
        selector: &VersionSelector,
    ) -> Result<CredentialRecord>;

    /// Write `record` as version `version_id` and label it `AWSPENDING`.
    ///
    /// Must not touch the version labelled `AWSCURRENT`.
    async fn put_pending_credential(
        &self,
        secret_id: &str,
        version_id: &str,
        record: &CredentialRecord,
    ) -> Result<()>;

    /// Move `stage` onto `to_version`, removing it from `from_version`.
    async fn move_stage(
        &self,
        secret_id: &str,
        stage: &VersionStage,
        to_version: &str,
        from_version: Option<&str>,
    ) -> Result<()>;

    /// Like [`get_credential`](Self::get_credential), but a missing version or
    /// value yields `Ok(None)`.
    async fn find_credential(
        &self,
        secret_id: &str,
        selector: &VersionSelector,
    ) -> Result<Option<CredentialRecord>> {
        match self.get_credential(secret_id, selector).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
