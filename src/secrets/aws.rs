//! AWS Secrets Manager store
//!
//! Maps the staged store operations onto the Secrets Manager API:
//!
//! | Operation                  | API call                                          |
//! |----------------------------|---------------------------------------------------|
//! | `describe`                 | `DescribeSecret`                                  |
//! | `get_credential`           | `GetSecretValue` (by stage or version id)         |
//! | `put_pending_credential`   | `PutSecretValue` with `VersionStages=[AWSPENDING]`|
//! | `move_stage`               | `UpdateSecretVersionStage`                        |
//!
//! ## Configuration
//!
//! - `ROTATOR_AWS_REGION` - Optional (falls back to the SDK's default chain)
//! - `ROTATOR_AWS_ENDPOINT_URL` - Optional, e.g. LocalStack at `http://localhost:4566`

use serde::{Deserialize, Serialize};

#[cfg(feature = "aws")]
use super::{
    client::SecretStore,
    credential::CredentialRecord,
    error::{Result, SecretsError},
    types::{SecretDescription, StageMap, VersionSelector, VersionStage},
};
#[cfg(feature = "aws")]
use async_trait::async_trait;
#[cfg(feature = "aws")]
use aws_sdk_secretsmanager::{error::SdkError, Client as SecretsManagerClient};
#[cfg(feature = "aws")]
use tracing::{debug, error, info};

/// Connection settings for the AWS Secrets Manager store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsStoreConfig {
    /// AWS region; `None` uses the SDK's default provider chain.
    pub region: Option<String>,

    /// Alternative endpoint (LocalStack or another compatible service).
    pub endpoint_url: Option<String>,
}

/// Secret store backed by AWS Secrets Manager.
#[cfg(feature = "aws")]
#[derive(Clone)]
pub struct AwsSecretsManagerStore {
    client: SecretsManagerClient,
    config: AwsStoreConfig,
}

#[cfg(feature = "aws")]
impl std::fmt::Debug for AwsSecretsManagerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretsManagerStore")
            .field("config", &self.config)
            .field("client", &"[SecretsManagerClient]")
            .finish()
    }
}

#[cfg(feature = "aws")]
impl AwsSecretsManagerStore {
    /// Build a client from the SDK's default credential chain.
    pub async fn new(config: AwsStoreConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let client = SecretsManagerClient::new(&sdk_config);

        info!(
            region = ?config.region,
            endpoint_url = ?config.endpoint_url,
            "Initialized AWS Secrets Manager store"
        );

        Self { client, config }
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: SecretsManagerClient) -> Self {
        Self { client, config: AwsStoreConfig::default() }
    }
}

/// Translate an SDK failure, keeping "not found" distinguishable.
#[cfg(feature = "aws")]
fn map_sdk_error<E, R>(
    operation: &str,
    key: &str,
    err: SdkError<E, R>,
    is_not_found: impl Fn(&E) -> bool,
) -> SecretsError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    if err.as_service_error().is_some_and(&is_not_found) {
        return SecretsError::not_found(key);
    }

    let detail = aws_sdk_secretsmanager::error::DisplayErrorContext(&err).to_string();
    error!(operation = %operation, secret_id = %key, error = %detail, "Secrets Manager call failed");

    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            SecretsError::connection_failed(format!("{}: {}", operation, detail))
        }
        _ if detail.contains("AccessDenied") || detail.contains("UnrecognizedClient") => {
            SecretsError::authentication_failed(format!("{}: {}", operation, detail))
        }
        _ => SecretsError::backend_error(format!("{}: {}", operation, detail)),
    }
}

#[cfg(feature = "aws")]
#[async_trait]
impl SecretStore for AwsSecretsManagerStore {
    #[tracing::instrument(skip(self), fields(backend = "aws"))]
    async fn describe(&self, secret_id: &str) -> Result<SecretDescription> {
        let output =
            self.client.describe_secret().secret_id(secret_id).send().await.map_err(|e| {
                map_sdk_error("DescribeSecret", secret_id, e, |e| e.is_resource_not_found_exception())
            })?;

        let mut versions = StageMap::new();
        if let Some(stage_map) = output.version_ids_to_stages() {
            for (version_id, labels) in stage_map {
                versions.insert(
                    version_id.clone(),
                    labels.iter().map(|label| VersionStage::from_label(label)).collect(),
                );
            }
        }

        let last_rotated_at = output
            .last_rotated_date()
            .and_then(|date| chrono::DateTime::from_timestamp(date.secs(), date.subsec_nanos()));

        debug!(secret_id = %secret_id, versions = versions.len(), "Described secret");

        Ok(SecretDescription {
            secret_id: secret_id.to_string(),
            rotation_enabled: output.rotation_enabled().unwrap_or(false),
            versions,
            last_rotated_at,
        })
    }

    #[tracing::instrument(skip(self), fields(backend = "aws"))]
    async fn get_credential(
        &self,
        secret_id: &str,
        selector: &VersionSelector,
    ) -> Result<CredentialRecord> {
        let request = self.client.get_secret_value().secret_id(secret_id);
        let request = match selector {
            VersionSelector::Stage(stage) => request.version_stage(stage.as_label()),
            VersionSelector::Version { version_id, stage } => request
                .version_id(version_id)
                .set_version_stage(stage.as_ref().map(|s| s.as_label().to_string())),
        };

        let output = request.send().await.map_err(|e| {
            map_sdk_error("GetSecretValue", secret_id, e, |e| e.is_resource_not_found_exception())
        })?;

        let raw = output.secret_string().ok_or_else(|| {
            SecretsError::invalid_value(format!(
                "secret '{}' ({}) has no string value",
                secret_id, selector
            ))
        })?;

        CredentialRecord::from_secret_string(raw)
    }

    #[tracing::instrument(skip(self, record), fields(backend = "aws"))]
    async fn put_pending_credential(
        &self,
        secret_id: &str,
        version_id: &str,
        record: &CredentialRecord,
    ) -> Result<()> {
        let value = record.to_secret_string()?;

        self.client
            .put_secret_value()
            .secret_id(secret_id)
            .client_request_token(version_id)
            .secret_string(value.expose_secret())
            .version_stages(VersionStage::Pending.as_label())
            .send()
            .await
            .map_err(|e| {
                map_sdk_error("PutSecretValue", secret_id, e, |e| e.is_resource_not_found_exception())
            })?;

        debug!(secret_id = %secret_id, version_id = %version_id, "Stored pending version");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(backend = "aws"))]
    async fn move_stage(
        &self,
        secret_id: &str,
        stage: &VersionStage,
        to_version: &str,
        from_version: Option<&str>,
    ) -> Result<()> {
        self.client
            .update_secret_version_stage()
            .secret_id(secret_id)
            .version_stage(stage.as_label())
            .move_to_version_id(to_version)
            .set_remove_from_version_id(from_version.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                map_sdk_error("UpdateSecretVersionStage", secret_id, e, |e| {
                    e.is_resource_not_found_exception()
                })
            })?;

        debug!(
            secret_id = %secret_id,
            stage = %stage,
            to_version = %to_version,
            from_version = ?from_version,
            "Moved version stage"
        );
        Ok(())
    }
}

// Stub struct for non-feature builds (allows type to exist but not be constructable)
#[cfg(not(feature = "aws"))]
pub struct AwsSecretsManagerStore {
    _private: (),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AwsStoreConfig::default();
        assert!(config.region.is_none());
        assert!(config.endpoint_url.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = AwsStoreConfig {
            region: Some("eu-west-2".to_string()),
            endpoint_url: Some("http://localhost:4566".to_string()),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AwsStoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.region.as_deref(), Some("eu-west-2"));
        assert_eq!(parsed.endpoint_url.as_deref(), Some("http://localhost:4566"));
    }
}
