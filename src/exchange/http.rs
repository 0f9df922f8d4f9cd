//! HTTP implementation of [`CredentialExchange`].

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};
use url::Url;

use super::client::{CredentialExchange, TokenPair};
use super::error::UpstreamError;
use crate::config::ExchangeConfig;
use crate::errors::{Result, RotatorError};
use crate::secrets::SecretString;

const REFRESH_OPERATION: &str = "token refresh";
const PROBE_OPERATION: &str = "credential probe";

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize, Default)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Talks to an OAuth issuer's token endpoint and to one protected resource.
#[derive(Debug, Clone)]
pub struct HttpCredentialExchange {
    client: Client,
    token_url: Url,
    probe_url: Url,
    api_version_header: HeaderName,
    api_version: HeaderValue,
    api_key_header: HeaderName,
}

impl HttpCredentialExchange {
    /// Build the client; fails on malformed URLs or header names.
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| RotatorError::internal(format!("Failed to create HTTP client: {}", e)))?;

        let base = Url::parse(&config.base_url).map_err(|e| {
            RotatorError::config_with_source("Invalid issuer base URL", Box::new(e))
        })?;
        let token_url = join_path(&base, &config.token_path)?;
        let probe_url = join_path(&base, &config.probe_path)?;

        let api_version_header = HeaderName::from_str(&config.api_version_header)
            .map_err(|e| RotatorError::config(format!("Invalid API version header: {}", e)))?;
        let api_version = HeaderValue::from_str(&config.api_version)
            .map_err(|e| RotatorError::config(format!("Invalid API version: {}", e)))?;
        let api_key_header = HeaderName::from_str(&config.api_key_header)
            .map_err(|e| RotatorError::config(format!("Invalid API key header: {}", e)))?;

        Ok(Self { client, token_url, probe_url, api_version_header, api_version, api_key_header })
    }
}

/// Append `path` to `base`, keeping any path prefix `base` already has.
fn join_path(base: &Url, path: &str) -> Result<Url> {
    let mut joined = base.clone();
    let prefix = base.path().trim_end_matches('/');
    joined.set_path(&format!("{}{}", prefix, path));
    if joined.cannot_be_a_base() {
        return Err(RotatorError::config(format!("Cannot build endpoint URL from {}", base)));
    }
    Ok(joined)
}

fn map_send_error(operation: &str, err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::timeout(operation)
    } else {
        UpstreamError::transport(operation, err.without_url().to_string())
    }
}

fn reason_of(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown Status").to_string()
}

#[async_trait]
impl CredentialExchange for HttpCredentialExchange {
    async fn refresh(
        &self,
        refresh_token: &SecretString,
        client_id: &str,
        client_secret: &SecretString,
    ) -> std::result::Result<TokenPair, UpstreamError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
            client_id,
            client_secret: client_secret.expose_secret(),
            redirect_uri: "",
            grant_type: "refresh_token",
        };

        debug!(url = %self.token_url, client_id = %client_id, "Requesting token refresh");

        let response = self
            .client
            .post(self.token_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(REFRESH_OPERATION, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let detail: TokenErrorResponse = response.json().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                error = ?detail.error,
                "Token endpoint rejected refresh"
            );
            return Err(UpstreamError::rejected(
                status.as_u16(),
                reason_of(status),
                detail.error,
                detail.error_description,
            ));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            UpstreamError::invalid_response(REFRESH_OPERATION, e.without_url().to_string())
        })?;

        if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
            return Err(UpstreamError::invalid_response(
                REFRESH_OPERATION,
                "token response is missing access_token or refresh_token",
            ));
        }

        Ok(TokenPair::new(tokens.access_token, tokens.refresh_token))
    }

    async fn probe(
        &self,
        access_token: &SecretString,
        client_id: &str,
    ) -> std::result::Result<(), UpstreamError> {
        let api_key = HeaderValue::from_str(client_id).map_err(|_| {
            UpstreamError::invalid_response(PROBE_OPERATION, "client id is not a valid header value")
        })?;

        debug!(url = %self.probe_url, "Probing protected resource");

        let response = self
            .client
            .get(self.probe_url.clone())
            .bearer_auth(access_token.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .header(self.api_version_header.clone(), self.api_version.clone())
            .header(self.api_key_header.clone(), api_key)
            .send()
            .await
            .map_err(|e| map_send_error(PROBE_OPERATION, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::rejected(status.as_u16(), reason_of(status), None, None));
        }

        Ok(())
    }
}
