//! The `error` module defines the crate-level error type.
//!
//! Each concern owns its error enum next to the code that raises it
//! (`CredentialError`, `TransportError`, `TimerError`, ...). `EngineError`
//! aggregates them for the public engine API so callers can use `?` across
//! module boundaries.
//!
//! Only credential and key failures are fatal to a connection attempt. The
//! rest are reported to the caller or logged by the worker, which keeps
//! running.

use thiserror::Error;

use crate::credential::CredentialError;
use crate::dispatcher::{PeriodError, TimerError};
use crate::identity::IdentityError;
use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("credential: {0}")]
    Credential(#[from] CredentialError),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("timer: {0}")]
    Timer(#[from] TimerError),

    #[error("period: {0}")]
    Period(#[from] PeriodError),

    #[error("identity: {0}")]
    Identity(#[from] IdentityError),

    #[error("state serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("engine already started")]
    AlreadyStarted,

    #[error("engine is not running inside a tokio runtime")]
    NoRuntime,
}

impl EngineError {
    /// True for failures that abort the connection attempt outright.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Credential(_))
    }
}
