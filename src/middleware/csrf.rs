//! Cross-site request forgery check (`CSRF_PROTECTION`).
//!
//! Bearer credentials are never sent automatically by browsers, so this is a
//! second line of defence: a state-changing request that carries an `Origin`
//! header must come from the same host or from an allowlisted origin.
//! Requests without `Origin` (curl, native clients) pass.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::error::AppError;

#[derive(Clone, Debug, Default)]
pub struct CsrfPolicy {
    allowed_origins: Arc<Vec<HeaderValue>>,
}

impl CsrfPolicy {
    pub fn new(allowed_origins: Vec<HeaderValue>) -> Self {
        Self {
            allowed_origins: Arc::new(allowed_origins),
        }
    }

    pub fn permits(&self, method: &Method, headers: &HeaderMap) -> bool {
        if is_safe(method) {
            return true;
        }
        let Some(origin) = headers.get(header::ORIGIN) else {
            return true;
        };
        if self.allowed_origins.iter().any(|o| o == origin) {
            return true;
        }
        same_host(origin, headers)
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn same_host(origin: &HeaderValue, headers: &HeaderMap) -> bool {
    let (Ok(origin), Some(Ok(host))) = (
        origin.to_str(),
        headers.get(header::HOST).map(|h| h.to_str()),
    ) else {
        return false;
    };
    origin
        .split_once("://")
        .is_some_and(|(_, authority)| authority.eq_ignore_ascii_case(host))
}

pub fn apply(router: Router, policy: CsrfPolicy) -> Router {
    router.layer(middleware::from_fn_with_state(policy, csrf_middleware))
}

async fn csrf_middleware(State(policy): State<CsrfPolicy>, req: Request, next: Next) -> Response {
    if policy.permits(req.method(), req.headers()) {
        return next.run(req).await;
    }
    tracing::warn!(
        method = %req.method(),
        path = req.uri().path(),
        origin = ?req.headers().get(header::ORIGIN),
        "cross-site request blocked"
    );
    AppError::Forbidden.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(origin: Option<&'static str>, host: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::HOST, HeaderValue::from_static(host));
        if let Some(o) = origin {
            h.insert(header::ORIGIN, HeaderValue::from_static(o));
        }
        h
    }

    fn policy() -> CsrfPolicy {
        CsrfPolicy::new(vec![HeaderValue::from_static("https://app.example")])
    }

    #[test]
    fn safe_methods_always_pass() {
        let h = headers(Some("https://evil.example"), "api.example");
        assert!(policy().permits(&Method::GET, &h));
    }

    #[test]
    fn unsafe_cross_site_request_is_blocked() {
        let h = headers(Some("https://evil.example"), "api.example");
        assert!(!policy().permits(&Method::POST, &h));
        assert!(!policy().permits(&Method::DELETE, &h));
    }

    #[test]
    fn allowlisted_same_host_and_originless_requests_pass() {
        let allowlisted = headers(Some("https://app.example"), "api.example");
        let same_host = headers(Some("http://api.example:3000"), "api.example:3000");
        let originless = headers(None, "api.example");

        assert!(policy().permits(&Method::POST, &allowlisted));
        assert!(policy().permits(&Method::POST, &same_host));
        assert!(policy().permits(&Method::POST, &originless));
    }
}
