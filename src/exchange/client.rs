//! Credential exchange trait.

use async_trait::async_trait;

use super::error::UpstreamError;
use crate::secrets::SecretString;

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
}

impl TokenPair {
    pub fn new(access_token: impl Into<SecretString>, refresh_token: impl Into<SecretString>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

/// Calls against the upstream credential issuer and the resource server it protects.
///
/// Each method is a single request with a bounded timeout and no retry; the
/// rotation orchestrator owns retry and backoff.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    /// Trade a refresh token for a new token pair (`grant_type=refresh_token`).
    async fn refresh(
        &self,
        refresh_token: &SecretString,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<TokenPair, UpstreamError>;

    /// Make one authenticated request against a protected resource.
    ///
    /// `Ok(())` only for HTTP 200.
    async fn probe(&self, access_token: &SecretString, client_id: &str) -> Result<(), UpstreamError>;
}
