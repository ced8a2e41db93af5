//! CSRF 校验
//!
//! 写请求必须携带与会话 `csrf` 声明一致的令牌，来源优先级：
//! 请求体 `csrf_token` > `X-CSRF-Token` 头。

use http::HeaderMap;
use shared::{AppError, AppResult, ErrorCode};

use super::AdminSession;
use crate::security_log;

pub const CSRF_HEADER: &str = "x-csrf-token";

/// 从请求头读取 CSRF 令牌
pub fn header_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// 校验提交的令牌与会话令牌一致
pub fn verify(session: &AdminSession, provided: Option<&str>) -> AppResult<()> {
    let Some(provided) = provided.filter(|t| !t.is_empty()) else {
        security_log!(WARN, "csrf_missing", username = %session.username);
        return Err(AppError::new(ErrorCode::CsrfTokenMissing));
    };

    if session.csrf.is_empty() || !constant_time_eq(session.csrf.as_bytes(), provided.as_bytes()) {
        security_log!(WARN, "csrf_mismatch", username = %session.username);
        return Err(AppError::new(ErrorCode::CsrfTokenInvalid));
    }

    Ok(())
}

/// 等长输入的比较耗时与内容无关
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
