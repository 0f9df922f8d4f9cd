//! Common test utilities for all integration tests.
//!
//! Provides a seeded in-memory secret store and a scripted credential exchange.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use async_trait::async_trait;
use oauth_rotator::exchange::{CredentialExchange, TokenPair, UpstreamError};
use oauth_rotator::secrets::{
    CredentialRecord, InMemorySecretStore, SecretStore, SecretString, VersionSelector,
    VersionStage,
};
use oauth_rotator::{RotationRequest, RotationStateMachine, RotationStep};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const SECRET_ID: &str = "trakt/oauth";
pub const CLIENT_ID: &str = "client-id-1";
pub const CLIENT_SECRET: &str = "client-secret-1";

pub fn current_record() -> CredentialRecord {
    CredentialRecord::new("A", "R", CLIENT_ID, CLIENT_SECRET)
}

/// Store holding `v1` as `AWSCURRENT` with `{A, R}`.
pub async fn seeded_store() -> InMemorySecretStore {
    let store = InMemorySecretStore::new();
    store.seed_current(SECRET_ID, "v1", &current_record()).await.unwrap();
    store
}

/// Store with `v1` current and an empty `v2` staged as `AWSPENDING`.
pub async fn store_with_attempt() -> InMemorySecretStore {
    let store = seeded_store().await;
    store.stage_pending(SECRET_ID, "v2").await.unwrap();
    store
}

pub fn request(token: &str, step: RotationStep) -> RotationRequest {
    RotationRequest::new(SECRET_ID, token, step)
}

pub async fn credential_at(
    store: &InMemorySecretStore,
    selector: VersionSelector,
) -> CredentialRecord {
    store.get_credential(SECRET_ID, &selector).await.unwrap()
}

pub async fn current_credential(store: &InMemorySecretStore) -> CredentialRecord {
    credential_at(store, VersionSelector::stage(VersionStage::Current)).await
}

/// A call observed by [`ScriptedExchange`], with secrets exposed for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeCall {
    Refresh { refresh_token: String, client_id: String, client_secret: String },
    Probe { access_token: String, client_id: String },
}

/// Credential exchange that replays queued answers and records every call.
///
/// With an empty queue, refresh yields `{A', R'}` and probe succeeds.
#[derive(Default)]
pub struct ScriptedExchange {
    refresh_answers: Mutex<VecDeque<Result<TokenPair, UpstreamError>>>,
    probe_answers: Mutex<VecDeque<Result<(), UpstreamError>>>,
    calls: Mutex<Vec<ExchangeCall>>,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_answer(self, answer: Result<TokenPair, UpstreamError>) -> Self {
        self.refresh_answers.lock().unwrap().push_back(answer);
        self
    }

    pub fn probe_answer(self, answer: Result<(), UpstreamError>) -> Self {
        self.probe_answers.lock().unwrap().push_back(answer);
        self
    }

    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, ExchangeCall::Refresh { .. })).count()
    }

    pub fn probe_count(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, ExchangeCall::Probe { .. })).count()
    }
}

#[async_trait]
impl CredentialExchange for ScriptedExchange {
    async fn refresh(
        &self,
        refresh_token: &SecretString,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<TokenPair, UpstreamError> {
        self.calls.lock().unwrap().push(ExchangeCall::Refresh {
            refresh_token: refresh_token.expose_secret().to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.expose_secret().to_string(),
        });
        self.refresh_answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TokenPair::new("A'", "R'")))
    }

    async fn probe(&self, access_token: &SecretString, client_id: &str) -> Result<(), UpstreamError> {
        self.calls.lock().unwrap().push(ExchangeCall::Probe {
            access_token: access_token.expose_secret().to_string(),
            client_id: client_id.to_string(),
        });
        self.probe_answers.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

pub fn machine(
    store: &InMemorySecretStore,
    exchange: ScriptedExchange,
) -> (RotationStateMachine, Arc<ScriptedExchange>) {
    let exchange = Arc::new(exchange);
    (RotationStateMachine::new(Arc::new(store.clone()), exchange.clone()), exchange)
}
