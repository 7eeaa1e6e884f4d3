use serde::Serialize;
use uuid::Uuid;

use crate::api::extractors::Identity;

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            username: identity.username,
            role: identity.role,
        }
    }
}
