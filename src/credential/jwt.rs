//! RS256 token minting on top of `jsonwebtoken`.
//!
//! Header is fixed to `{"alg":"RS256","typ":"JWT"}`; the payload carries the
//! issue time, an expiry 24 hours later and the project id as audience.

use std::path::Path;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// How long a minted token stays valid, in seconds.
pub const TOKEN_VALIDITY_SECS: i64 = 24 * 60 * 60;

/// Key or signing failure. Fatal to the connection attempt.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("private key could not be parsed: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),

    #[error("private key could not be read from {path}: {source}")]
    KeyFile {
        path: String,
        source: std::io::Error,
    },

    #[error("signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Token payload: issue time, expiry and audience (the project id).
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}

impl Claims {
    pub fn new(project_id: &str) -> Self {
        let now = Utc::now();
        Self {
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_VALIDITY_SECS)).timestamp(),
            aud: project_id.to_string(),
        }
    }
}

/// Mints a signed token for `project_id` using an RSA private key in PEM form.
pub fn create_jwt(project_id: &str, private_key_pem: &[u8]) -> Result<String, CredentialError> {
    JwtSigner::from_pem(private_key_pem)?.mint(project_id)
}

/// Holds parsed key material so repeated connection attempts skip the PEM parse.
#[derive(Clone)]
pub struct JwtSigner {
    key: EncodingKey,
}

impl JwtSigner {
    pub fn from_pem(private_key_pem: &[u8]) -> Result<Self, CredentialError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem).map_err(CredentialError::InvalidKey)?;
        Ok(Self { key })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|source| CredentialError::KeyFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_pem(&pem)
    }

    /// Signs a new token for `project_id`, valid from now for
    /// `TOKEN_VALIDITY_SECS`.
    pub fn mint(&self, project_id: &str) -> Result<String, CredentialError> {
        let claims = Claims::new(project_id);
        debug!(iat = claims.iat, exp = claims.exp, aud = %claims.aud, "minting device token");
        encode(&Header::new(Algorithm::RS256), &claims, &self.key).map_err(CredentialError::Signing)
    }
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("key", &"RS256 private key")
            .finish()
    }
}
