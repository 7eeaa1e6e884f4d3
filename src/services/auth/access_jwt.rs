use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;
use std::{error::Error as StdError, fmt};
use uuid::Uuid;

use crate::config::SigningKeys;
use crate::services::auth::jwt::{self, KeyError};

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    Jwt(jsonwebtoken::errors::Error),
    EmptyClaim(&'static str),
    InvalidSubUuid,
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
            Self::InvalidSubUuid => write!(f, "invalid 'sub' (expected UUID)"),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

impl AccessJwtError {
    /// True when the token was well-formed and correctly signed but has expired.
    pub fn is_expired(&self) -> bool {
        matches!(
            self,
            Self::Jwt(e) if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature)
        )
    }
}

/// Access token (JWT) claims.
///
/// `iss`/`aud`/`exp` are checked by `jsonwebtoken::Validation`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    pub sub: String,
    pub exp: u64,

    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub jti: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Verified token, converted into the type the resolver works with.
#[derive(Debug, Clone)]
pub struct VerifiedAccessToken {
    pub user_id: Uuid,
    pub jti: Option<String>,
    pub role: Option<String>,
}

/// Bearer token verifier (HS512 or EdDSA).
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AccessTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenVerifier {
    pub fn new(
        keys: &SigningKeys,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, KeyError> {
        let decoding_key = jwt::decoding_key(keys)?;

        let mut validation = Validation::new(jwt::algorithm(keys));
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    // Verify and decode a JWT access token.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify + strict claim validation.
    ///
    /// `jsonwebtoken::Validation` already checks signature, `exp`, `iss` and `aud`.
    /// This additionally rejects empty `iss`/`sub` and a zero `exp`.
    pub fn verify_strict(&self, token: &str) -> Result<AccessTokenClaims, AccessJwtError> {
        let claims = self.verify(token)?;

        if claims.iss.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("iss"));
        }
        if claims.sub.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("sub"));
        }
        if claims.exp == 0 {
            return Err(AccessJwtError::EmptyClaim("exp"));
        }

        Ok(claims)
    }

    /// Verify, then convert claims into [`VerifiedAccessToken`].
    pub fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let claims = self.verify_strict(token)?;

        // Project convention: subject is a UUID
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AccessJwtError::InvalidSubUuid)?;

        Ok(VerifiedAccessToken {
            user_id,
            jti: claims.jti,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::jwt::JwtIssuer;
    use serde_json::json;

    const SECRET: &str = "0123456789abcdef0123456789abcdef-test-secret";

    fn keys() -> SigningKeys {
        SigningKeys::Secret(SECRET.into())
    }

    fn verifier() -> AccessTokenVerifier {
        AccessTokenVerifier::new(&keys(), "gate-test", "clinic", 0).unwrap()
    }

    fn sign(claims: serde_json::Value) -> String {
        JwtIssuer::new(&keys(), "gate-test".into(), "clinic".into(), 60)
            .unwrap()
            .sign(&claims)
            .unwrap()
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    #[test]
    fn accepts_well_formed_token() {
        let sub = Uuid::new_v4();
        let token = sign(json!({
            "iss": "gate-test", "aud": "clinic", "sub": sub.to_string(),
            "exp": now() + 60, "jti": "abc", "role": "DOCTOR"
        }));

        let verified = verifier().verify_verified(&token).unwrap();
        assert_eq!(verified.user_id, sub);
        assert_eq!(verified.jti.as_deref(), Some("abc"));
        assert_eq!(verified.role.as_deref(), Some("DOCTOR"));
    }

    #[test]
    fn rejects_expired_token() {
        let token = sign(json!({
            "iss": "gate-test", "aud": "clinic", "sub": Uuid::new_v4().to_string(),
            "exp": now() - 120
        }));
        let err = verifier().verify_verified(&token).unwrap_err();
        assert!(err.is_expired());
    }

    #[test]
    fn rejects_wrong_audience_and_issuer() {
        let sub = Uuid::new_v4().to_string();
        let wrong_aud = sign(json!({
            "iss": "gate-test", "aud": "other", "sub": sub, "exp": now() + 60
        }));
        let wrong_iss = sign(json!({
            "iss": "someone-else", "aud": "clinic", "sub": sub, "exp": now() + 60
        }));
        assert!(verifier().verify_verified(&wrong_aud).is_err());
        assert!(verifier().verify_verified(&wrong_iss).is_err());
    }

    #[test]
    fn rejects_tampered_signature() {
        let token = sign(json!({
            "iss": "gate-test", "aud": "clinic", "sub": Uuid::new_v4().to_string(),
            "exp": now() + 60
        }));
        // flip a character well inside the signature segment
        let idx = token.len() - 10;
        let original = token.as_bytes()[idx] as char;
        let replacement = if original == 'A' { "B" } else { "A" };
        let mut tampered = token.clone();
        tampered.replace_range(idx..idx + 1, replacement);

        assert!(verifier().verify_verified(&tampered).is_err());
    }

    #[test]
    fn rejects_token_signed_with_another_key() {
        let other = SigningKeys::Secret("another-secret-another-secret-another".into());
        let token = JwtIssuer::new(&other, "gate-test".into(), "clinic".into(), 60)
            .unwrap()
            .sign(&json!({
                "iss": "gate-test", "aud": "clinic", "sub": Uuid::new_v4().to_string(),
                "exp": now() + 60
            }))
            .unwrap();
        assert!(verifier().verify_verified(&token).is_err());
    }

    #[test]
    fn rejects_non_uuid_subject_and_garbage() {
        let token = sign(json!({
            "iss": "gate-test", "aud": "clinic", "sub": "alice@example.com", "exp": now() + 60
        }));
        assert!(matches!(
            verifier().verify_verified(&token),
            Err(AccessJwtError::InvalidSubUuid)
        ));
        assert!(verifier().verify_verified("not.a.jwt").is_err());
        assert!(verifier().verify_verified("").is_err());
    }
}
