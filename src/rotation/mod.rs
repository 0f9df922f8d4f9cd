//! # Credential Rotation
//!
//! Implements the four-step rotation protocol driven by an external
//! orchestrator:
//!
//! 1. **createSecret**: trade the current refresh token for a new pair and
//!    store it as the `AWSPENDING` version
//! 2. **setSecret**: nothing to provision; the issuer already holds the new tokens
//! 3. **testSecret**: authenticate against the resource server with the pending
//!    access token
//! 4. **finishSecret**: move `AWSCURRENT` to the pending version
//!
//! Every step first checks that rotation is enabled and that the request token
//! is a known version. A token already labelled `AWSCURRENT` short-circuits to
//! success, which makes every step safe to replay.

pub mod error;
pub mod machine;
pub mod request;
pub mod validation;

pub use error::RotationError;
pub use machine::RotationStateMachine;
pub use request::{RotationRequest, RotationStep};
pub use validation::validate_pending;
