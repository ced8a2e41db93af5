//! 认证模块 - 管理员会话与 CSRF
//!
//! - [`SessionService`] - 会话令牌验证 (HS256 JWT)
//! - [`AdminSession`] - 当前管理员上下文
//! - [`require_admin`] - 写接口认证中间件
//! - [`csrf`] - 防伪令牌校验

pub mod csrf;
pub mod middleware;
pub mod session;

pub use middleware::{SESSION_COOKIE, require_admin};
pub use session::{
    ADMIN_ROLE, AdminSession, SessionClaims, SessionConfig, SessionError, SessionService,
};
