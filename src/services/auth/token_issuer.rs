use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::UserRecord;
use crate::services::auth::jwt::JwtIssuer;

#[derive(Debug, Serialize)]
pub(crate) struct AccessTokenClaims<'a> {
    pub iss: &'a str,
    pub aud: &'a str,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub role: &'a str,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
    pub jti: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    jwt: JwtIssuer,
}

impl TokenIssuer {
    pub fn new(jwt: JwtIssuer) -> Self {
        Self { jwt }
    }

    /// Issue an access token for a user whose password was already verified.
    pub fn issue_access_token(&self, user: &UserRecord) -> Result<IssuedToken, AppError> {
        let now = chrono::Utc::now().timestamp();
        let exp = now + self.jwt.ttl_seconds() as i64;
        let jti = Uuid::new_v4().to_string();

        let claims = AccessTokenClaims {
            iss: self.jwt.issuer(),
            aud: self.jwt.audience(),
            sub: user.id.to_string(),
            iat: now,
            exp,
            jti: jti.clone(),
            role: &user.role,
        };

        Ok(IssuedToken {
            access_token: self.jwt.sign(&claims)?,
            expires_in: self.jwt.ttl_seconds(),
            jti,
        })
    }
}
