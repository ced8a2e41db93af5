//! 认证中间件
//!
//! 为写接口提供管理员会话校验

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderMap;
use shared::{AppError, ErrorCode};

use crate::auth::{AdminSession, SessionError, SessionService};
use crate::core::ServerState;
use crate::security_log;

/// 会话 Cookie 名
pub const SESSION_COOKIE: &str = "admin_session";

/// 管理员认证中间件
///
/// 令牌来源 (按优先级)：
/// 1. `Authorization: Bearer <token>`
/// 2. Cookie `admin_session=<token>`
///
/// 验证成功后将 [`AdminSession`] 注入请求扩展。
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无令牌 | 403 NotAuthenticated |
/// | 令牌过期 | 403 TokenExpired |
/// | 无效令牌 | 403 TokenInvalid |
/// | 非管理员 | 403 AdminRequired |
pub async fn require_admin(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = session_token(req.headers()) else {
        security_log!(WARN, "auth_missing", uri = %req.uri());
        return Err(AppError::unauthorized());
    };

    let claims = match state.session_service.validate_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(WARN, "auth_failed", error = %e, uri = %req.uri());
            return Err(match e {
                SessionError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid session"),
            });
        }
    };

    let session = AdminSession::from(claims);
    if !session.is_admin() {
        security_log!(
            WARN,
            "permission_denied",
            user_id = %session.id,
            username = %session.username,
            role = %session.role
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// 从请求头或 Cookie 读取会话令牌
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(SessionService::extract_from_header)
    {
        return Some(token.to_string());
    }

    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
