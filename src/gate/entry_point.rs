//! Unauthorized entry point: the single place that turns a gate rejection
//! into an HTTP response.
use axum::response::{IntoResponse, Response};

use super::GateError;
use crate::error::AppError;

/// 401 with `WWW-Authenticate: Bearer` and a fixed body.
///
/// The error kind is only logged; the body is identical for every kind.
pub fn unauthorized(err: GateError, method: &axum::http::Method, path: &str) -> Response {
    match err {
        GateError::MissingCredential => {
            tracing::debug!(%method, path, "rejected: {err}");
        }
        GateError::InvalidCredential | GateError::LookupUnavailable => {
            tracing::info!(%method, path, "rejected: {err}");
        }
    }
    AppError::Unauthorized.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode, header};

    #[tokio::test]
    async fn every_kind_produces_the_same_response() {
        let mut bodies = Vec::new();
        for err in [
            GateError::MissingCredential,
            GateError::InvalidCredential,
            GateError::LookupUnavailable,
        ] {
            let res = unauthorized(err, &Method::GET, "/x");
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
            let body = axum::body::to_bytes(res.into_body(), usize::MAX)
                .await
                .unwrap();
            bodies.push(body);
        }
        assert!(bodies.windows(2).all(|w| w[0] == w[1]));

        let json: serde_json::Value = serde_json::from_slice(&bodies[0]).unwrap();
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }
}
