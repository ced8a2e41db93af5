//! 核心模块 - 服务器配置、状态和错误定义
//!
//! # 模块结构
//!
//! - [`Config`] - 分层配置 (默认值 → TOML → 环境变量)
//! - [`ServerState`] - 服务器状态
//! - [`Server`] - HTTP 服务器
//! - [`ServerError`] - 启动错误

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{Config, ConfigError, LogConfig};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
