/*
 * Responsibility
 * - URL 構造を定義
 * - 認証の要否は gate の RoutePolicy が決める (ここでは route_layer を使わない)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{health::health, login::login, me::me};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/me", get(me))
        .fallback(|| async { AppError::not_found("route") })
}
