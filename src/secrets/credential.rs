//! The credential document stored in each secret version.
//!
//! Stored as a JSON object:
//!
//! ```json
//! {
//!   "ACCESS_TOKEN": "...",
//!   "REFRESH_TOKEN": "...",
//!   "CLIENT_ID": "...",
//!   "CLIENT_SECRET": "..."
//! }
//! ```
//!
//! Keys other than these four are kept as-is and written back on rotation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{Result, SecretsError};
use super::types::SecretString;

/// An OAuth client registration plus its current token pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialRecord {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub client_id: String,
    pub client_secret: SecretString,
    extra: Map<String, Value>,
}

/// Wire form. Only built transiently while encoding or decoding.
#[derive(Serialize, Deserialize)]
struct CredentialDocument {
    #[serde(rename = "ACCESS_TOKEN", default)]
    access_token: String,
    #[serde(rename = "REFRESH_TOKEN")]
    refresh_token: String,
    #[serde(rename = "CLIENT_ID")]
    client_id: String,
    #[serde(rename = "CLIENT_SECRET")]
    client_secret: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl CredentialRecord {
    pub fn new(
        access_token: impl Into<SecretString>,
        refresh_token: impl Into<SecretString>,
        client_id: impl Into<String>,
        client_secret: impl Into<SecretString>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            extra: Map::new(),
        }
    }

    /// Attach a non-credential key that should ride along with the record.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Keys stored alongside the credential that this crate does not interpret.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Copy of this record with a freshly issued token pair.
    ///
    /// Client id, client secret and any extra keys are carried over unchanged.
    pub fn with_rotated_tokens(&self, access_token: SecretString, refresh_token: SecretString) -> Self {
        Self {
            access_token,
            refresh_token,
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Decode the JSON document stored in a secret version.
    pub fn from_secret_string(raw: &str) -> Result<Self> {
        let doc: CredentialDocument = serde_json::from_str(raw).map_err(|e| {
            // serde_json messages can quote input; keep only the position.
            SecretsError::invalid_value(format!(
                "credential document is not valid ({:?} error at line {}, column {})",
                e.classify(),
                e.line(),
                e.column()
            ))
        })?;

        if doc.client_id.is_empty() {
            return Err(SecretsError::invalid_value("CLIENT_ID must not be empty"));
        }
        if doc.refresh_token.is_empty() {
            return Err(SecretsError::invalid_value("REFRESH_TOKEN must not be empty"));
        }

        Ok(Self {
            access_token: SecretString::new(doc.access_token),
            refresh_token: SecretString::new(doc.refresh_token),
            client_id: doc.client_id,
            client_secret: SecretString::new(doc.client_secret),
            extra: doc.extra,
        })
    }

    /// Encode the record as the JSON document written to the store.
    pub fn to_secret_string(&self) -> Result<SecretString> {
        let doc = CredentialDocument {
            access_token: self.access_token.expose_secret().to_string(),
            refresh_token: self.refresh_token.expose_secret().to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.expose_secret().to_string(),
            extra: self.extra.clone(),
        };
        Ok(SecretString::new(serde_json::to_string(&doc)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_without_access_token() {
        let raw = json!({
            "REFRESH_TOKEN": "refresh123",
            "CLIENT_ID": "clientid123",
            "CLIENT_SECRET": "clientsecret123"
        })
        .to_string();

        let record = CredentialRecord::from_secret_string(&raw).unwrap();
        assert!(record.access_token.is_empty());
        assert_eq!(record.refresh_token.expose_secret(), "refresh123");
        assert_eq!(record.client_id, "clientid123");
    }

    #[test]
    fn test_rotation_preserves_client_and_extra_fields() {
        let raw = json!({
            "ACCESS_TOKEN": "old-access",
            "REFRESH_TOKEN": "old-refresh",
            "CLIENT_ID": "client",
            "CLIENT_SECRET": "shh",
            "LIST_OWNER": "someone"
        })
        .to_string();
        let current = CredentialRecord::from_secret_string(&raw).unwrap();

        let rotated = current.with_rotated_tokens("A".into(), "B".into());
        let written: Value =
            serde_json::from_str(rotated.to_secret_string().unwrap().expose_secret()).unwrap();

        assert_eq!(
            written,
            json!({
                "ACCESS_TOKEN": "A",
                "REFRESH_TOKEN": "B",
                "CLIENT_ID": "client",
                "CLIENT_SECRET": "shh",
                "LIST_OWNER": "someone"
            })
        );
        assert_eq!(current.access_token.expose_secret(), "old-access");
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let err = CredentialRecord::from_secret_string(r#"{"CLIENT_ID": "c"}"#).unwrap_err();
        assert!(matches!(err, SecretsError::InvalidValue { .. }));

        let err = CredentialRecord::from_secret_string(
            r#"{"REFRESH_TOKEN": "", "CLIENT_ID": "c", "CLIENT_SECRET": "s"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("REFRESH_TOKEN"));
    }

    #[test]
    fn test_decode_error_does_not_echo_input() {
        let err = CredentialRecord::from_secret_string("{\"REFRESH_TOKEN\": very-secret").unwrap_err();
        assert!(!err.to_string().contains("very-secret"));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let record = CredentialRecord::new("tok-a-123", "tok-r-456", "client-1", "sec-789");
        let debug = format!("{:?}", record);
        assert!(debug.contains("client-1"));
        assert!(!debug.contains("tok-a-123"));
        assert!(!debug.contains("tok-r-456"));
        assert!(!debug.contains("sec-789"));
    }
}
