//! 工具模块 - 日志与时间
//!
//! 错误类型统一来自 `shared::error`，这里只做 re-export。

pub mod logger;
pub mod time;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
