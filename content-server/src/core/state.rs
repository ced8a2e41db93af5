use std::sync::Arc;

use crate::auth::SessionService;
use crate::content::{ContentService, ContentStore, MenuNormalizer};
use crate::core::Config;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。文档本身不缓存，
/// 每个请求都从磁盘重新读取。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Arc<Config> | 配置项 (不可变) |
/// | session_service | Arc<SessionService> | 会话令牌验证 |
/// | content | ContentService | 内容读写管线 (含写锁) |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Arc<Config>,
    /// 会话令牌服务
    pub session_service: Arc<SessionService>,
    /// 内容服务
    pub content: ContentService,
}

impl ServerState {
    /// 根据配置初始化所有服务
    pub fn initialize(config: &Config) -> Self {
        let store = ContentStore::new(config.content_path.clone(), config.business_timezone)
            .with_file_mode(config.content_file_mode);
        let normalizer = MenuNormalizer::new(config.legacy_quantity);

        Self::with_content(config, ContentService::new(store, normalizer))
    }

    /// 使用指定的内容服务 (测试中注入失败的文件系统)
    pub fn with_content(config: &Config, content: ContentService) -> Self {
        Self {
            config: Arc::new(config.clone()),
            session_service: Arc::new(SessionService::with_config(config.session.clone())),
            content,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
