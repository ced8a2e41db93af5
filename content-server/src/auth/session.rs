//! 管理员会话令牌
//!
//! 登录由外部系统完成，本服务只验证令牌。令牌是 HS256 JWT，
//! 其中 `csrf` 声明绑定了该会话的防伪令牌。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 管理员角色名
pub const ADMIN_ROLE: &str = "admin";

/// 会话密钥最小长度 (字节)
pub const MIN_SECRET_LEN: usize = 32;

/// 会话配置
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HS256 密钥 (应至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("expiration_minutes", &self.expiration_minutes)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl SessionConfig {
    pub const DEFAULT_ISSUER: &'static str = "content-admin";
    pub const DEFAULT_AUDIENCE: &'static str = "content-server";
    pub const DEFAULT_EXPIRATION_MINUTES: i64 = 120;

    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: Self::DEFAULT_EXPIRATION_MINUTES,
            issuer: Self::DEFAULT_ISSUER.to_string(),
            audience: Self::DEFAULT_AUDIENCE.to_string(),
        }
    }
}

/// 开发环境临时密钥 (每次启动不同)
pub fn generate_dev_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// 存储在令牌中的会话 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户名
    pub username: String,
    /// 角色名称
    pub role: String,
    /// 会话绑定的 CSRF 令牌
    pub csrf: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// 会话错误
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// 会话令牌服务
#[derive(Clone)]
pub struct SessionService {
    config: SessionConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionService {
    pub fn with_config(config: SessionConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 签发会话令牌
    ///
    /// 供外部登录系统及测试使用；HTTP 接口不签发令牌。
    pub fn issue(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        csrf: &str,
    ) -> Result<String, SessionError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = SessionClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            csrf: csrf.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => SessionError::ExpiredToken,
                    ErrorKind::InvalidSignature => SessionError::InvalidSignature,
                    _ => SessionError::InvalidToken(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

/// 当前管理员会话 (由认证中间件注入请求扩展)
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub id: String,
    pub username: String,
    pub role: String,
    /// 会话绑定的 CSRF 令牌
    pub csrf: String,
}

impl From<SessionClaims> for AdminSession {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            csrf: claims.csrf,
        }
    }
}

impl AdminSession {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}
