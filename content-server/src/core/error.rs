use thiserror::Error;

use super::config::ConfigError;

/// 启动与运行期错误 (HTTP 错误统一使用 `shared::AppError`)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("端口绑定失败: {0}")]
    Bind(#[source] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
