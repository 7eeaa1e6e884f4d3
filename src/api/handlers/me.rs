/*
 * Responsibility
 * - GET /me: gate が解決した Identity をそのまま返す
 */
use axum::Json;

use crate::api::dto::identity::IdentityResponse;
use crate::api::extractors::CurrentIdentity;

pub async fn me(CurrentIdentity(identity): CurrentIdentity) -> Json<IdentityResponse> {
    Json(identity.into())
}
