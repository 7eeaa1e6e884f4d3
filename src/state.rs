/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - リクエスト間で共有する可変状態は持たない
 */
use std::sync::Arc;

use crate::repos::UserDirectory;
use crate::services::auth::{PasswordEncoder, TokenIssuer};

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn UserDirectory>,
    pub passwords: PasswordEncoder,
    pub issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        passwords: PasswordEncoder,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            directory,
            passwords,
            issuer,
        }
    }
}
