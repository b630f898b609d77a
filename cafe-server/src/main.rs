use anyhow::Context;
use cafe_server::{Config, Server, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载 .env (可选)
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env().context("failed to load configuration")?;

    // 3. 初始化日志
    let log_dir = config.log_dir();
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        log_dir.to_str(),
    );

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Cafe server starting..."
    );

    // 4. 启动 HTTP 服务器 (Server::run 会启动后台任务)
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
