//! Core types shared by secret store backends: redacting strings, stage labels,
//! stage maps and version selectors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A token or client secret that never shows up in logs.
///
/// `Debug`, `Display` and `Serialize` all print `[REDACTED]`; the value is only
/// reachable through [`SecretString::expose_secret`]. Memory is zeroed on drop.
///
/// Stores that need the real value on the wire (the credential document written
/// to a backend, the token request body) must build their payload from
/// `expose_secret()` explicitly.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the underlying value. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// True if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Stage label attached to a secret version.
///
/// The three rotation labels map onto the `AWSCURRENT`/`AWSPENDING`/`AWSPREVIOUS`
/// wire names. Any other label a backend reports is kept as [`VersionStage::Custom`]
/// so it survives a describe round trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionStage {
    Current,
    Pending,
    Previous,
    Custom(String),
}

impl VersionStage {
    /// Wire label used by the secret store.
    pub fn as_label(&self) -> &str {
        match self {
            Self::Current => "AWSCURRENT",
            Self::Pending => "AWSPENDING",
            Self::Previous => "AWSPREVIOUS",
            Self::Custom(label) => label,
        }
    }

    /// Parse a wire label. Never fails; unknown labels become `Custom`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "AWSCURRENT" => Self::Current,
            "AWSPENDING" => Self::Pending,
            "AWSPREVIOUS" => Self::Previous,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for VersionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl Serialize for VersionStage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_label())
    }
}

impl<'de> Deserialize<'de> for VersionStage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Mapping from version id to the stage labels it currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageMap(BTreeMap<String, BTreeSet<VersionStage>>);

impl StageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with_version(
        mut self,
        version_id: impl Into<String>,
        stages: impl IntoIterator<Item = VersionStage>,
    ) -> Self {
        self.0.insert(version_id.into(), stages.into_iter().collect());
        self
    }

    pub fn insert(&mut self, version_id: impl Into<String>, stages: BTreeSet<VersionStage>) {
        self.0.insert(version_id.into(), stages);
    }

    /// Stages held by `version_id`, or `None` if the version is unknown.
    pub fn stages_of(&self, version_id: &str) -> Option<&BTreeSet<VersionStage>> {
        self.0.get(version_id)
    }

    /// Whether `version_id` holds `stage`.
    pub fn has_stage(&self, version_id: &str, stage: &VersionStage) -> bool {
        self.0.get(version_id).is_some_and(|stages| stages.contains(stage))
    }

    /// First version holding `stage`.
    pub fn version_with_stage(&self, stage: &VersionStage) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, stages)| stages.contains(stage))
            .map(|(version_id, _)| version_id.as_str())
    }

    /// Number of versions holding `stage`.
    pub fn count_with_stage(&self, stage: &VersionStage) -> usize {
        self.0.values().filter(|stages| stages.contains(stage)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<VersionStage>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a `describe` call reports about a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretDescription {
    pub secret_id: String,
    pub rotation_enabled: bool,
    pub versions: StageMap,
    pub last_rotated_at: Option<DateTime<Utc>>,
}

/// Which version of a secret to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// Whatever version currently holds this stage.
    Stage(VersionStage),
    /// A specific version, optionally required to hold a stage.
    Version { version_id: String, stage: Option<VersionStage> },
}

impl VersionSelector {
    pub fn stage(stage: VersionStage) -> Self {
        Self::Stage(stage)
    }

    pub fn version(version_id: impl Into<String>) -> Self {
        Self::Version { version_id: version_id.into(), stage: None }
    }

    pub fn version_in_stage(version_id: impl Into<String>, stage: VersionStage) -> Self {
        Self::Version { version_id: version_id.into(), stage: Some(stage) }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stage(stage) => write!(f, "stage {}", stage),
            Self::Version { version_id, stage: None } => write!(f, "version {}", version_id),
            Self::Version { version_id, stage: Some(stage) } => {
                write!(f, "version {} ({})", version_id, stage)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_redacts_debug_and_display() {
        let secret = SecretString::new("super-secret-value");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(secret.expose_secret(), "super-secret-value");
    }

    #[test]
    fn test_secret_string_serialization_redacts() {
        let secret = SecretString::new("super-secret-value");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"[REDACTED]\"");

        let parsed: SecretString = serde_json::from_str("\"actual\"").unwrap();
        assert_eq!(parsed.expose_secret(), "actual");
    }

    #[test]
    fn test_stage_label_round_trip() {
        for stage in [VersionStage::Current, VersionStage::Pending, VersionStage::Previous] {
            assert_eq!(VersionStage::from_label(stage.as_label()), stage);
        }
        assert_eq!(
            VersionStage::from_label("blue-green"),
            VersionStage::Custom("blue-green".to_string())
        );
    }

    #[test]
    fn test_stage_map_queries() {
        let map = StageMap::new()
            .with_version("v1", [VersionStage::Current])
            .with_version("v2", [VersionStage::Pending])
            .with_version("v0", [VersionStage::Previous]);

        assert!(map.has_stage("v1", &VersionStage::Current));
        assert!(!map.has_stage("v2", &VersionStage::Current));
        assert!(!map.has_stage("v9", &VersionStage::Pending));
        assert_eq!(map.version_with_stage(&VersionStage::Current), Some("v1"));
        assert_eq!(map.count_with_stage(&VersionStage::Pending), 1);
        assert!(map.stages_of("v9").is_none());
    }

    #[test]
    fn test_stage_map_serializes_wire_labels() {
        let map = StageMap::new().with_version("v1", [VersionStage::Current]);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({ "v1": ["AWSCURRENT"] }));

        let parsed: StageMap =
            serde_json::from_value(serde_json::json!({ "v2": ["AWSPENDING", "custom"] })).unwrap();
        assert!(parsed.has_stage("v2", &VersionStage::Pending));
        assert!(parsed.has_stage("v2", &VersionStage::Custom("custom".into())));
    }

    #[test]
    fn test_version_selector_display() {
        assert_eq!(VersionSelector::stage(VersionStage::Current).to_string(), "stage AWSCURRENT");
        assert_eq!(
            VersionSelector::version_in_stage("v2", VersionStage::Pending).to_string(),
            "version v2 (AWSPENDING)"
        );
    }
}
