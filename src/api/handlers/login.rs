/*
 * Responsibility
 * - POST /login: username/password を検証して access token を発行する
 * - 未登録 / パスワード不一致 / 無効ユーザーはすべて同じ 401
 * - bcrypt は CPU を使うので spawn_blocking で実行する
 */
use axum::{Json, extract::State};

use crate::api::dto::login::{LoginRequest, TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_LOGIN_REQUEST", msg))?;

    let user = state.directory.find_by_username(req.username.trim()).await?;

    let passwords = state.passwords.clone();
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let password = req.password;
    let password_ok = tokio::task::spawn_blocking(move || {
        passwords.verify_or_dummy(&password, stored_hash.as_deref())
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "password verification task failed");
        AppError::Internal
    })?;

    let user = match user {
        Some(user) if password_ok && user.enabled => user,
        _ => {
            tracing::info!(username = %req.username, "login rejected");
            return Err(AppError::Unauthorized);
        }
    };

    let issued = state.issuer.issue_access_token(&user)?;
    tracing::info!(user_id = %user.id, jti = %issued.jti, "access token issued");

    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
    }))
}
