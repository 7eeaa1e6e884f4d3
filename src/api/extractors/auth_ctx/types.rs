/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - gate が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証やユーザー解決は gate / services 側の責務
 * - Identity はリクエスト単位で生成され、リクエスト間でキャッシュしない
 */

use uuid::Uuid;

/// Resolved principal of an authenticated request.
///
/// - `user_id` は token の `sub` (UUID)
/// - `username` / `role` はユーザーディレクトリから解決した現在値
/// - `jti` は監査/相関用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    pub jti: Option<String>,
}

/// What the gate attaches to every forwarded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Authenticated(Identity),
    Anonymous,
}

impl Principal {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Principal::Authenticated(identity) => Some(identity),
            Principal::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }
}
