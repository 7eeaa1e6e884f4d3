//! Request gate: decides, per request, whether a bearer credential is needed,
//! validates it, and produces the principal attached to the request.
//!
//! The gate is stateless. The only shared data is the compiled
//! [`RoutePolicy`], which is read-only after startup.

pub mod entry_point;
pub mod pattern;
pub mod policy;
pub mod reference;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, Method, header};
use thiserror::Error;

use crate::api::extractors::Principal;
use crate::services::auth::{CredentialResolver, ResolveError};

pub use pattern::{AntPattern, PatternError};
pub use policy::{Access, MethodMatch, PolicyError, RoutePolicy, RouteRule};
pub use reference::reference_policy;

/// Why a request was rejected. All kinds produce the same 401 response.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("invalid bearer credential")]
    InvalidCredential,
    #[error("identity lookup unavailable")]
    LookupUnavailable,
}

#[derive(Clone)]
pub struct Gate {
    policy: Arc<RoutePolicy>,
    resolver: Arc<dyn CredentialResolver>,
    lookup_timeout: Duration,
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("rules", &self.policy.rules().len())
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}

impl Gate {
    pub fn new(
        policy: RoutePolicy,
        resolver: Arc<dyn CredentialResolver>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            policy: Arc::new(policy),
            resolver,
            lookup_timeout,
        }
    }

    /// Decide what happens to a request.
    ///
    /// `Ok` means forward with the given principal; `Err` means reject.
    pub async fn intercept(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Principal, GateError> {
        match self.policy.resolve(method, path) {
            Access::Ignore => Ok(Principal::Anonymous),
            Access::Permit => match self.authenticate(headers).await {
                Ok(principal) => Ok(principal),
                Err(err) => {
                    tracing::debug!(
                        %method,
                        path,
                        error = %err,
                        "optional credential not accepted"
                    );
                    Ok(Principal::Anonymous)
                }
            },
            Access::Authenticate => self.authenticate(headers).await,
        }
    }

    async fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, GateError> {
        let token = bearer_token(headers).ok_or(GateError::MissingCredential)?;

        let resolved = tokio::time::timeout(self.lookup_timeout, self.resolver.resolve(token))
            .await
            .map_err(|_| {
                tracing::warn!(
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "identity lookup timed out"
                );
                GateError::InvalidCredential
            })?;

        match resolved {
            Ok(identity) => Ok(Principal::Authenticated(identity)),
            Err(ResolveError::Directory(err)) => {
                tracing::error!(error = %err, "identity lookup failed");
                Err(GateError::LookupUnavailable)
            }
            Err(ResolveError::Token(err)) if err.is_expired() => {
                tracing::debug!("access token expired");
                Err(GateError::InvalidCredential)
            }
            Err(err) => {
                tracing::warn!(error = %err, "access token rejected");
                Err(GateError::InvalidCredential)
            }
        }
    }
}

/// `Authorization: Bearer <token>`; the scheme name is case-insensitive.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
