//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`content`] - 内容读取、保存与迁移

pub mod content;
pub mod health;
