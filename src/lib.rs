//! # oauth-rotator
//!
//! Rotates an OAuth access/refresh token pair held in a staged, versioned
//! secret store. An external orchestrator drives each rotation attempt through
//! four steps (`createSecret`, `setSecret`, `testSecret`, `finishSecret`); this
//! crate implements those steps as an idempotent state machine.
//!
//! ## Architecture
//!
//! ```text
//! RotationRequest → RotationStateMachine ─→ SecretStore        (describe / get / put / move stage)
//!                                        └→ CredentialExchange (refresh / probe)
//! ```
//!
//! ## Core Components
//!
//! - **rotation**: the state machine, its request type and errors
//! - **secrets**: the [`SecretStore`](secrets::SecretStore) trait with in-memory and
//!   AWS Secrets Manager backends, and the credential document format
//! - **exchange**: the [`CredentialExchange`](exchange::CredentialExchange) trait and
//!   its reqwest implementation
//! - **config** / **observability** / **cli**: environment configuration, logging
//!   and the `oauth-rotator` binary
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use oauth_rotator::{
//!     config::ExchangeConfig, exchange::HttpCredentialExchange, rotation::*,
//!     secrets::InMemorySecretStore,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemorySecretStore::from_snapshot_file("secrets.json").await?);
//! let exchange = Arc::new(HttpCredentialExchange::new(&ExchangeConfig::default())?);
//! let machine = RotationStateMachine::new(store, exchange);
//!
//! machine.handle(&RotationRequest::new("trakt", "v2", RotationStep::CreateSecret)).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod exchange;
pub mod observability;
pub mod rotation;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::RotatorConfig;
pub use errors::{Result, RotatorError};
pub use rotation::{RotationError, RotationRequest, RotationStateMachine, RotationStep};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
