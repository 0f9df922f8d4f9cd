//! In-memory staged secret store.
//!
//! Holds versions, stage labels and raw credential documents behind a lock and
//! follows the AWS Secrets Manager stage rules that rotation depends on:
//!
//! - writing a version attaches `AWSPENDING` to it and detaches it from any
//!   other version
//! - re-writing a version with an identical value succeeds; a different value
//!   is a [`SecretsError::VersionConflict`]
//! - moving `AWSCURRENT` away from a version labels that version `AWSPREVIOUS`
//! - a stage can only be moved *from* a version that holds it, and a stage held
//!   elsewhere can't be attached without naming the version to take it from
//! - `AWSCURRENT` can't be attached to a version that has no value
//!
//! Every mutating call is recorded so tests can assert which writes happened.
//! The store can also be seeded from a JSON snapshot file for dry runs:
//!
//! ```json
//! {
//!   "secrets": {
//!     "trakt/oauth": {
//!       "rotation_enabled": true,
//!       "versions": {
//!         "v1": { "stages": ["AWSCURRENT"], "value": { "REFRESH_TOKEN": "...", "CLIENT_ID": "...", "CLIENT_SECRET": "..." } }
//!       }
//!     }
//!   }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::client::SecretStore;
use super::credential::CredentialRecord;
use super::error::{Result, SecretsError};
use super::types::{SecretDescription, SecretString, StageMap, VersionSelector, VersionStage};

/// A mutating call observed by an [`InMemorySecretStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    PutPending { secret_id: String, version_id: String },
    MoveStage { secret_id: String, stage: VersionStage, to_version: String, from_version: Option<String> },
}

#[derive(Debug, Clone)]
struct StoredVersion {
    value: Option<SecretString>,
    stages: BTreeSet<VersionStage>,
}

#[derive(Debug, Clone)]
struct StoredSecret {
    rotation_enabled: bool,
    versions: BTreeMap<String, StoredVersion>,
    last_rotated_at: Option<DateTime<Utc>>,
}

impl StoredSecret {
    fn stage_map(&self) -> StageMap {
        let mut map = StageMap::new();
        for (version_id, version) in &self.versions {
            map.insert(version_id.clone(), version.stages.clone());
        }
        map
    }

    fn holder_of(&self, stage: &VersionStage) -> Option<String> {
        self.versions
            .iter()
            .find(|(_, v)| v.stages.contains(stage))
            .map(|(version_id, _)| version_id.clone())
    }

    fn detach_everywhere(&mut self, stage: &VersionStage) {
        for version in self.versions.values_mut() {
            version.stages.remove(stage);
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    secrets: HashMap<String, StoredSecret>,
    operations: Vec<StoreOperation>,
}

/// Staged, versioned secret store kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Deserialize)]
struct Snapshot {
    secrets: HashMap<String, SnapshotSecret>,
}

#[derive(Deserialize)]
struct SnapshotSecret {
    #[serde(default = "default_rotation_enabled")]
    rotation_enabled: bool,
    versions: BTreeMap<String, SnapshotVersion>,
}

#[derive(Deserialize)]
struct SnapshotVersion {
    stages: BTreeSet<VersionStage>,
    value: Option<serde_json::Value>,
}

fn default_rotation_enabled() -> bool {
    true
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load secrets from a JSON snapshot file.
    pub async fn from_snapshot_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        let store = Self::new();

        {
            let mut inner = store.inner.write().await;
            for (secret_id, secret) in snapshot.secrets {
                let versions = secret
                    .versions
                    .into_iter()
                    .map(|(version_id, v)| {
                        let value = v.value.map(|doc| SecretString::new(doc.to_string()));
                        (version_id, StoredVersion { value, stages: v.stages })
                    })
                    .collect();
                inner.secrets.insert(
                    secret_id,
                    StoredSecret {
                        rotation_enabled: secret.rotation_enabled,
                        versions,
                        last_rotated_at: None,
                    },
                );
            }
        }

        Ok(store)
    }

    /// Create (or replace) a secret whose only version is `version_id`, labelled `AWSCURRENT`.
    pub async fn seed_current(
        &self,
        secret_id: &str,
        version_id: &str,
        record: &CredentialRecord,
    ) -> Result<()> {
        let value = record.to_secret_string()?;
        let mut versions = BTreeMap::new();
        versions.insert(
            version_id.to_string(),
            StoredVersion { value: Some(value), stages: BTreeSet::from([VersionStage::Current]) },
        );

        let mut inner = self.inner.write().await;
        inner.secrets.insert(
            secret_id.to_string(),
            StoredSecret { rotation_enabled: true, versions, last_rotated_at: None },
        );
        Ok(())
    }

    /// Register an empty version labelled `AWSPENDING`, the way the rotation
    /// orchestrator does before it calls `createSecret`.
    pub async fn stage_pending(&self, secret_id: &str, version_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let secret =
            inner.secrets.get_mut(secret_id).ok_or_else(|| SecretsError::not_found(secret_id))?;

        secret.detach_everywhere(&VersionStage::Pending);
        secret
            .versions
            .entry(version_id.to_string())
            .or_insert_with(|| StoredVersion { value: None, stages: BTreeSet::new() })
            .stages
            .insert(VersionStage::Pending);
        Ok(())
    }

    pub async fn set_rotation_enabled(&self, secret_id: &str, enabled: bool) -> Result<()> {
        let mut inner = self.inner.write().await;
        let secret =
            inner.secrets.get_mut(secret_id).ok_or_else(|| SecretsError::not_found(secret_id))?;
        secret.rotation_enabled = enabled;
        Ok(())
    }

    /// Current stage map of a secret, if it exists.
    pub async fn stage_map(&self, secret_id: &str) -> Option<StageMap> {
        self.inner.read().await.secrets.get(secret_id).map(StoredSecret::stage_map)
    }

    /// Mutating calls made so far, oldest first.
    pub async fn operations(&self) -> Vec<StoreOperation> {
        self.inner.read().await.operations.clone()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn describe(&self, secret_id: &str) -> Result<SecretDescription> {
        let inner = self.inner.read().await;
        let secret = inner.secrets.get(secret_id).ok_or_else(|| SecretsError::not_found(secret_id))?;

        Ok(SecretDescription {
            secret_id: secret_id.to_string(),
            rotation_enabled: secret.rotation_enabled,
            versions: secret.stage_map(),
            last_rotated_at: secret.last_rotated_at,
        })
    }

    async fn get_credential(
        &self,
        secret_id: &str,
        selector: &VersionSelector,
    ) -> Result<CredentialRecord> {
        let inner = self.inner.read().await;
        let secret = inner.secrets.get(secret_id).ok_or_else(|| SecretsError::not_found(secret_id))?;
        let missing = || SecretsError::not_found(format!("{} ({})", secret_id, selector));

        let version = match selector {
            VersionSelector::Stage(stage) => secret
                .versions
                .values()
                .find(|v| v.stages.contains(stage))
                .ok_or_else(missing)?,
            VersionSelector::Version { version_id, stage } => {
                let version = secret.versions.get(version_id).ok_or_else(missing)?;
                if let Some(stage) = stage {
                    if !version.stages.contains(stage) {
                        return Err(missing());
                    }
                }
                version
            }
        };

        let value = version.value.as_ref().ok_or_else(missing)?;
        CredentialRecord::from_secret_string(value.expose_secret())
    }

    async fn put_pending_credential(
        &self,
        secret_id: &str,
        version_id: &str,
        record: &CredentialRecord,
    ) -> Result<()> {
        let value = record.to_secret_string()?;
        let mut inner = self.inner.write().await;
        let secret =
            inner.secrets.get_mut(secret_id).ok_or_else(|| SecretsError::not_found(secret_id))?;

        if let Some(existing) = secret.versions.get(version_id).and_then(|v| v.value.as_ref()) {
            if existing != &value {
                return Err(SecretsError::version_conflict(secret_id, version_id));
            }
        }

        secret.detach_everywhere(&VersionStage::Pending);
        let version = secret
            .versions
            .entry(version_id.to_string())
            .or_insert_with(|| StoredVersion { value: None, stages: BTreeSet::new() });
        version.value = Some(value);
        version.stages.insert(VersionStage::Pending);

        debug!(secret_id = %secret_id, version_id = %version_id, "Stored pending version");
        inner.operations.push(StoreOperation::PutPending {
            secret_id: secret_id.to_string(),
            version_id: version_id.to_string(),
        });
        Ok(())
    }

    async fn move_stage(
        &self,
        secret_id: &str,
        stage: &VersionStage,
        to_version: &str,
        from_version: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let secret =
            inner.secrets.get_mut(secret_id).ok_or_else(|| SecretsError::not_found(secret_id))?;

        let Some(target) = secret.versions.get(to_version) else {
            return Err(SecretsError::not_found(format!("{} (version {})", secret_id, to_version)));
        };
        if *stage == VersionStage::Current && target.value.is_none() {
            return Err(SecretsError::invalid_stage(
                secret_id,
                format!("version {} has no value and cannot become {}", to_version, stage),
            ));
        }

        let holder = secret.holder_of(stage);
        match (from_version, holder.as_deref()) {
            (Some(from), Some(current)) if from == current => {}
            (Some(from), _) => {
                return Err(SecretsError::invalid_stage(
                    secret_id,
                    format!("version {} does not hold {}", from, stage),
                ));
            }
            (None, Some(current)) if current != to_version => {
                return Err(SecretsError::invalid_stage(
                    secret_id,
                    format!("{} is attached to version {}; name it as the source", stage, current),
                ));
            }
            (None, _) => {}
        }

        if let Some(from) = from_version.filter(|from| *from != to_version) {
            if let Some(version) = secret.versions.get_mut(from) {
                version.stages.remove(stage);
            }
            if *stage == VersionStage::Current {
                secret.detach_everywhere(&VersionStage::Previous);
                if let Some(version) = secret.versions.get_mut(from) {
                    version.stages.insert(VersionStage::Previous);
                }
                secret.last_rotated_at = Some(Utc::now());
            }
        }

        if let Some(version) = secret.versions.get_mut(to_version) {
            version.stages.insert(stage.clone());
        }

        debug!(
            secret_id = %secret_id,
            stage = %stage,
            to_version = %to_version,
            from_version = ?from_version,
            "Moved version stage"
        );
        inner.operations.push(StoreOperation::MoveStage {
            secret_id: secret_id.to_string(),
            stage: stage.clone(),
            to_version: to_version.to_string(),
            from_version: from_version.map(str::to_string),
        });
        Ok(())
    }
}
