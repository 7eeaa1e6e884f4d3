//! Security-related response headers for browser clients.
//!
//! Frame blocking (`X-Frame-Options: DENY` + `frame-ancestors 'none'`) is
//! controlled by the `FRAME_OPTIONS` flag. Turning it off allows the API's
//! responses to be framed by any site; the reference deployment does this for
//! an embedded console.

use axum::Router;
use axum::http::header::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Apply common security headers to all responses.
pub fn apply(router: Router, frame_options: bool) -> Router {
    let router = if frame_options {
        router
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("content-security-policy"),
                HeaderValue::from_static("frame-ancestors 'none'"),
            ))
    } else {
        router
    };

    router
        // Prevent MIME sniffing
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        // Limit referrer leakage
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("no-referrer"),
        ))
        // Stateless API: responses carry per-user data and must not be cached
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cache-control"),
            HeaderValue::from_static("no-store"),
        ))
}
