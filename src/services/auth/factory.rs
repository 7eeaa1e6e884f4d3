/// Factory: build the auth services from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::repos::UserDirectory;
use crate::services::auth::{
    AccessTokenVerifier, JwtIssuer, KeyError, PasswordEncoder, PasswordError, TokenIssuer,
    TokenResolver,
};

#[derive(Debug, thiserror::Error)]
pub enum AuthBuildError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

pub struct AuthServices {
    pub issuer: Arc<TokenIssuer>,
    pub resolver: Arc<TokenResolver>,
    pub passwords: PasswordEncoder,
}

pub fn build_auth_services(
    config: &Config,
    directory: Arc<dyn UserDirectory>,
) -> Result<AuthServices, AuthBuildError> {
    let jwt = JwtIssuer::new(
        &config.signing_keys,
        config.auth_issuer.clone(),
        config.auth_audience.clone(),
        config.access_token_ttl_seconds,
    )?;

    let verifier = AccessTokenVerifier::new(
        &config.signing_keys,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    )?;

    Ok(AuthServices {
        issuer: Arc::new(TokenIssuer::new(jwt)),
        resolver: Arc::new(TokenResolver::new(verifier, directory)),
        passwords: PasswordEncoder::new(config.bcrypt_cost)?,
    })
}
