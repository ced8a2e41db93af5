use content_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载 .env (不存在时忽略)
    dotenv::dotenv().ok();

    // 2. 加载配置 (默认值 → config.toml → 环境变量)
    let config = Config::load()?;

    // 3. 初始化日志
    init_logger_with_file(&config.log.level, config.log.json, config.log.dir.as_deref())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "Content server starting..."
    );

    // 4. 初始化服务器状态并启动 HTTP 服务器
    let state = ServerState::initialize(&config);
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
