//! Gate middleware: runs [`Gate::intercept`] in front of every handler.
//!
//! On success the [`Principal`] (and, when authenticated, the [`Identity`]) is
//! stored in request extensions and the request is forwarded exactly once.
//! On failure the unauthorized entry point answers and no handler runs.

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::{Identity, Principal};
use crate::gate::{Gate, entry_point};

/// Apply the gate to every route (and the fallback) of `router`.
///
/// Every method is gated, OPTIONS included; CORS preflights are answered by
/// the CORS layer outside this one.
///
/// Call after all routes are registered:
/// ```ignore
/// let app = Router::new().route("/me", get(me)).with_state(state);
/// let app = middleware::auth::access::apply(app, gate);
/// ```
pub fn apply(router: Router, gate: Gate) -> Router {
    router.layer(middleware::from_fn_with_state(gate, access_middleware))
}

async fn access_middleware(State(gate): State<Gate>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();

    match gate.intercept(req.method(), &path, req.headers()).await {
        Ok(principal) => {
            if let Principal::Authenticated(identity) = &principal {
                tracing::debug!(user_id = %identity.user_id, path, "authenticated");
                req.extensions_mut().insert::<Identity>(identity.clone());
            }
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(err) => entry_point::unauthorized(err, req.method(), &path),
    }
}
