//! Content Server - 餐厅网站内容存储的保存管线
//!
//! # 架构概述
//!
//! 管理后台按 section 编辑单个 JSON 内容文档。本服务负责：
//!
//! - **合并** (`content::merge`): 按 payload 形状决定替换或递归合并
//! - **菜单规范化** (`content::menu`): 价格、数量校验与规范化
//! - **持久化** (`content::store`): 临时文件 + rename 原子替换
//! - **认证** (`auth`): 管理员会话 (JWT) + CSRF
//! - **HTTP API** (`api`): 保存、读取、迁移接口
//!
//! # 模块结构
//!
//! ```text
//! content-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # 会话验证、CSRF
//! ├── content/       # 合并、菜单规范化、存储、迁移
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装与中间件
//! └── utils/         # 日志、时间
//! ```

pub mod api;
pub mod auth;
pub mod content;
pub mod core;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use auth::{AdminSession, SessionService};
pub use content::{ContentService, ContentStore, LegacyQuantityPolicy, MenuNormalizer};
pub use crate::core::{Config, Server, ServerState};
pub use routes::build_app;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Security log helper - records security-related events
///
/// Security logs go to the `security` target (separate permanent file when
/// file logging is enabled).
///
/// # Examples
/// ```ignore
/// security_log!(WARN, "auth_failed", error = %e, uri = %req.uri());
/// security_log!(INFO, "session_ok", username = %session.username);
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            $($arg)*
        );
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(
            target: "security",
            event = $event,
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            $($arg)*
        );
    };
}
