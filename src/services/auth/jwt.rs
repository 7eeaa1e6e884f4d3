use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::config::SigningKeys;
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid token key material: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

pub(crate) fn algorithm(keys: &SigningKeys) -> Algorithm {
    match keys {
        SigningKeys::Secret(_) => Algorithm::HS512,
        SigningKeys::Ed25519 { .. } => Algorithm::EdDSA,
    }
}

pub(crate) fn decoding_key(keys: &SigningKeys) -> Result<DecodingKey, KeyError> {
    Ok(match keys {
        SigningKeys::Secret(secret) => DecodingKey::from_secret(secret.as_bytes()),
        SigningKeys::Ed25519 { public_key_pem, .. } => {
            DecodingKey::from_ed_pem(public_key_pem.as_bytes())?
        }
    })
}

fn encoding_key(keys: &SigningKeys) -> Result<EncodingKey, KeyError> {
    Ok(match keys {
        SigningKeys::Secret(secret) => EncodingKey::from_secret(secret.as_bytes()),
        SigningKeys::Ed25519 {
            private_key_pem, ..
        } => EncodingKey::from_ed_pem(private_key_pem.as_bytes())?,
    })
}

#[derive(Clone)]
pub struct JwtIssuer {
    issuer: String,
    audience: String,
    ttl_seconds: u64,
    algorithm: Algorithm,
    encoding_key: EncodingKey,
}

impl JwtIssuer {
    /// An Ed25519 private key must be PKCS#8 PEM.
    pub fn new(
        keys: &SigningKeys,
        issuer: String,
        audience: String,
        ttl_seconds: u64,
    ) -> Result<Self, KeyError> {
        Ok(Self {
            issuer,
            audience,
            ttl_seconds,
            algorithm: algorithm(keys),
            encoding_key: encoding_key(keys)?,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::Internal
        })
    }
}
