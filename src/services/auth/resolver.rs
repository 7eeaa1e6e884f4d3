//! Credential → Identity resolution.
//!
//! The gate only sees [`CredentialResolver`]; [`TokenResolver`] is the
//! production implementation (JWT verification + user directory lookup).
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::extractors::Identity;
use crate::repos::{RepoError, UserDirectory};
use crate::services::auth::access_jwt::{AccessJwtError, AccessTokenVerifier};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Token(#[from] AccessJwtError),
    #[error("user no longer exists")]
    UnknownUser,
    #[error("user is disabled")]
    Disabled,
    #[error("user directory unavailable: {0}")]
    Directory(#[from] RepoError),
}

#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Validate `token` and resolve the identity it stands for.
    async fn resolve(&self, token: &str) -> Result<Identity, ResolveError>;
}

#[derive(Clone)]
pub struct TokenResolver {
    verifier: AccessTokenVerifier,
    directory: Arc<dyn UserDirectory>,
}

impl TokenResolver {
    pub fn new(verifier: AccessTokenVerifier, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            verifier,
            directory,
        }
    }
}

#[async_trait]
impl CredentialResolver for TokenResolver {
    async fn resolve(&self, token: &str) -> Result<Identity, ResolveError> {
        let verified = self.verifier.verify_verified(token)?;

        let user = self
            .directory
            .find_by_id(verified.user_id)
            .await?
            .ok_or(ResolveError::UnknownUser)?;

        if !user.enabled {
            return Err(ResolveError::Disabled);
        }

        if let Some(claimed) = verified.role.as_deref()
            && claimed != user.role
        {
            tracing::debug!(
                user_id = %user.id,
                claimed,
                current = %user.role,
                "token role is stale; using directory role"
            );
        }

        Ok(Identity {
            user_id: user.id,
            username: user.username,
            role: user.role,
            jti: verified.jti,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningKeys;
    use crate::repos::{InMemoryUserDirectory, UserRecord};
    use crate::services::auth::jwt::JwtIssuer;
    use crate::services::auth::token_issuer::TokenIssuer;
    use uuid::Uuid;

    const SECRET: &str = "resolver-test-secret-resolver-test-secret";

    fn keys() -> SigningKeys {
        SigningKeys::Secret(SECRET.into())
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(JwtIssuer::new(&keys(), "iss".into(), "aud".into(), 300).unwrap())
    }

    fn user(enabled: bool) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            username: "doc@example.com".into(),
            password_hash: String::new(),
            role: "DOCTOR".into(),
            enabled,
        }
    }

    fn resolver(users: Vec<UserRecord>) -> TokenResolver {
        TokenResolver::new(
            AccessTokenVerifier::new(&keys(), "iss", "aud", 0).unwrap(),
            Arc::new(InMemoryUserDirectory::new(users)),
        )
    }

    struct BrokenDirectory;

    #[async_trait]
    impl UserDirectory for BrokenDirectory {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<UserRecord>, RepoError> {
            Err(RepoError::Db(sqlx::Error::PoolTimedOut))
        }

        async fn find_by_username(&self, _u: &str) -> Result<Option<UserRecord>, RepoError> {
            Err(RepoError::Db(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn resolves_identity_from_directory() {
        let u = user(true);
        let token = issuer().issue_access_token(&u).unwrap();

        let identity = resolver(vec![u.clone()])
            .resolve(&token.access_token)
            .await
            .unwrap();

        assert_eq!(identity.user_id, u.id);
        assert_eq!(identity.username, u.username);
        assert_eq!(identity.role, "DOCTOR");
        assert_eq!(identity.jti.as_deref(), Some(token.jti.as_str()));
    }

    #[tokio::test]
    async fn deleted_user_is_rejected() {
        let token = issuer().issue_access_token(&user(true)).unwrap();
        let err = resolver(vec![]).resolve(&token.access_token).await.unwrap_err();
        assert!(matches!(err, ResolveError::UnknownUser));
    }

    #[tokio::test]
    async fn disabled_user_is_rejected() {
        let u = user(false);
        let token = issuer().issue_access_token(&u).unwrap();
        let err = resolver(vec![u]).resolve(&token.access_token).await.unwrap_err();
        assert!(matches!(err, ResolveError::Disabled));
    }

    #[tokio::test]
    async fn directory_failure_is_reported_separately() {
        let u = user(true);
        let token = issuer().issue_access_token(&u).unwrap();
        let resolver = TokenResolver::new(
            AccessTokenVerifier::new(&keys(), "iss", "aud", 0).unwrap(),
            Arc::new(BrokenDirectory),
        );
        let err = resolver.resolve(&token.access_token).await.unwrap_err();
        assert!(matches!(err, ResolveError::Directory(_)));
    }

    #[tokio::test]
    async fn directory_role_wins_over_token_role() {
        let mut u = user(true);
        let token = issuer().issue_access_token(&u).unwrap();
        u.role = "CLINIC_ADMIN".into();

        let identity = resolver(vec![u]).resolve(&token.access_token).await.unwrap();
        assert_eq!(identity.role, "CLINIC_ADMIN");
    }

    #[tokio::test]
    async fn malformed_token_never_reaches_directory() {
        let resolver = TokenResolver::new(
            AccessTokenVerifier::new(&keys(), "iss", "aud", 0).unwrap(),
            Arc::new(BrokenDirectory),
        );
        let err = resolver.resolve("garbage").await.unwrap_err();
        assert!(matches!(err, ResolveError::Token(_)));
    }
}
