/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 適用順 (外 → 内): http → cors → security_headers → csrf → gate → handler
 */
pub mod auth;
pub mod cors;
pub mod csrf;
pub mod http;
pub mod security_headers;
