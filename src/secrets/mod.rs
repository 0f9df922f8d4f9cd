//! Staged secret store abstraction.
//!
//! A rotated credential lives in a versioned secret whose versions carry stage
//! labels. Rotation only ever needs four primitives, exposed by the
//! [`SecretStore`] trait:
//!
//! - **describe**: rotation flag and version-to-stages map
//! - **get_credential**: read a version by stage or by version id
//! - **put_pending_credential**: write a new version labelled `AWSPENDING`
//! - **move_stage**: move a label (normally `AWSCURRENT`) between versions
//!
//! # Backends
//!
//! - **AWS Secrets Manager**: production store (cargo feature `aws`)
//! - **In-memory**: tests and local dry runs, optionally seeded from a snapshot file
//!
//! # Security Considerations
//!
//! - Tokens and client secrets are held in [`SecretString`], which redacts itself
//!   in `Debug`, `Display` and `Serialize` output and zeroes memory on drop
//! - Store errors never carry the stored payload

pub mod aws;
pub mod client;
pub mod credential;
pub mod error;
pub mod memory;
pub mod types;

pub use aws::{AwsSecretsManagerStore, AwsStoreConfig};
pub use client::SecretStore;
pub use credential::CredentialRecord;
pub use error::{Result, SecretsError};
pub use memory::{InMemorySecretStore, StoreOperation};
pub use types::{SecretDescription, SecretString, StageMap, VersionSelector, VersionStage};
