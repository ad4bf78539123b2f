//! Credential generation
//!
//! The cloud bridge authenticates a device by a short-lived JWT passed as
//! the connection password. A fresh token is minted on every connection
//! attempt and discarded once the transport has it.

pub mod jwt;

pub use jwt::{Claims, CredentialError, JwtSigner, TOKEN_VALIDITY_SECS, create_jwt};
