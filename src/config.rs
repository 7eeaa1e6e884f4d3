/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - CSRF / frame-options はセキュリティ上のトレードオフなので明示的なフラグとして持つ
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::password;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Key material used to sign and verify bearer tokens.
///
/// Not printable via Debug.
#[derive(Clone)]
pub enum SigningKeys {
    /// HS512 shared secret.
    Secret(String),
    /// Ed25519 key pair in PKCS#8 / SPKI PEM.
    Ed25519 {
        private_key_pem: String,
        public_key_pem: String,
    },
}

impl fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningKeys::Secret(_) => f.write_str("SigningKeys::Secret(..)"),
            SigningKeys::Ed25519 { .. } => f.write_str("SigningKeys::Ed25519(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub signing_keys: SigningKeys,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,

    pub bcrypt_cost: u32,
    pub user_lookup_timeout: Duration,

    // Both default to enabled; disabling them is a deliberate trade-off.
    pub csrf_protection: bool,
    pub frame_options: bool,
    pub strict_route_policy: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins =
            parse_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let auth_issuer =
            std::env::var("AUTH_ISSUER").map_err(|_| ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let signing_keys = signing_keys_from_env()?;

        let access_token_ttl_seconds = std::env::var("ACCESS_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1800); // 30 min

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        // range is checked when the password encoder is built
        let bcrypt_cost = parse_bcrypt_cost(std::env::var("BCRYPT_COST").ok().as_deref())?;

        let user_lookup_timeout = Duration::from_millis(
            std::env::var("USER_LOOKUP_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(2000),
        );

        let csrf_protection = flag_from_env("CSRF_PROTECTION", true)?;
        let frame_options = flag_from_env("FRAME_OPTIONS", true)?;
        let strict_route_policy = flag_from_env("STRICT_ROUTE_POLICY", false)?;

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            auth_issuer,
            auth_audience,
            signing_keys,
            access_token_ttl_seconds,
            access_token_leeway_seconds,
            bcrypt_cost,
            user_lookup_timeout,
            csrf_protection,
            frame_options,
            strict_route_policy,
        })
    }
}

fn signing_keys_from_env() -> Result<SigningKeys, ConfigError> {
    if let Ok(secret) = std::env::var("ACCESS_JWT_SECRET") {
        if secret.len() < 32 {
            return Err(ConfigError::Invalid("ACCESS_JWT_SECRET"));
        }
        return Ok(SigningKeys::Secret(secret));
    }

    let private_key_pem = std::env::var("ACCESS_JWT_PRIVATE_KEY_PEM")
        .map_err(|_| ConfigError::Missing("ACCESS_JWT_SECRET or ACCESS_JWT_PRIVATE_KEY_PEM"))?
        .replace("\\n", "\n");
    let public_key_pem = std::env::var("ACCESS_JWT_PUBLIC_KEY_PEM")
        .map_err(|_| ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM"))?
        .replace("\\n", "\n");

    Ok(SigningKeys::Ed25519 {
        private_key_pem,
        public_key_pem,
    })
}

fn flag_from_env(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

fn parse_bcrypt_cost(raw: Option<&str>) -> Result<u32, ConfigError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::Invalid("BCRYPT_COST")),
        None => Ok(password::DEFAULT_COST),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_accepts_short_and_long_production_names() {
        assert_eq!(AppEnv::parse("prod"), AppEnv::Production);
        assert_eq!(AppEnv::parse("PRODUCTION"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn flags_parse_common_spellings() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" Off "), Some(false));
        assert_eq!(parse_flag("disabled"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn bcrypt_cost_defaults_to_ten_when_unset() {
        assert_eq!(parse_bcrypt_cost(None).unwrap(), 10);
        assert_eq!(parse_bcrypt_cost(Some(" 12 ")).unwrap(), 12);
        assert!(matches!(
            parse_bcrypt_cost(Some("ten")),
            Err(ConfigError::Invalid("BCRYPT_COST"))
        ));
    }

    #[test]
    fn origin_list_skips_blank_entries() {
        assert_eq!(
            parse_list("https://a.example, ,https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn signing_keys_debug_hides_material() {
        let keys = SigningKeys::Secret("super-secret-value".into());
        assert!(!format!("{keys:?}").contains("super-secret-value"));
    }
}
