//! Upstream credential exchange.
//!
//! Two calls leave the process during a rotation: trading the current refresh
//! token for a new pair at the issuer's token endpoint, and probing a protected
//! resource with the pending access token. Both sit behind the
//! [`CredentialExchange`] trait so the rotation state machine can be driven by
//! a fake in tests. [`HttpCredentialExchange`] is the real implementation.

pub mod client;
pub mod error;
pub mod http;

pub use client::{CredentialExchange, TokenPair};
pub use error::UpstreamError;
pub use http::HttpCredentialExchange;
