//! Rotation invocation payload.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// One step of the four-step rotation protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RotationStep {
    CreateSecret,
    SetSecret,
    TestSecret,
    FinishSecret,
    /// A step name this rotator doesn't know. Logged and ignored.
    Unrecognized(String),
}

impl RotationStep {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateSecret => "createSecret",
            Self::SetSecret => "setSecret",
            Self::TestSecret => "testSecret",
            Self::FinishSecret => "finishSecret",
            Self::Unrecognized(name) => name,
        }
    }

    /// Step names are case sensitive; anything else becomes [`Self::Unrecognized`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "createSecret" => Self::CreateSecret,
            "setSecret" => Self::SetSecret,
            "testSecret" => Self::TestSecret,
            "finishSecret" => Self::FinishSecret,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl FromStr for RotationStep {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for RotationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RotationStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RotationStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_name(&raw))
    }
}

/// `{ "SecretId", "ClientRequestToken", "Step" }` as delivered by the rotation orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRequest {
    #[serde(rename = "SecretId")]
    pub secret_id: String,

    /// Version id of the attempt; also the idempotency key.
    #[serde(rename = "ClientRequestToken")]
    pub client_request_token: String,

    #[serde(rename = "Step")]
    pub step: RotationStep,
}

impl RotationRequest {
    pub fn new(
        secret_id: impl Into<String>,
        client_request_token: impl Into<String>,
        step: RotationStep,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            client_request_token: client_request_token.into(),
            step,
        }
    }
}
