use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use upload_relay::config::Config;
use upload_relay::storage::S3Connector;
use upload_relay::{AppState, app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 文件
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_timer(UtcTime::rfc_3339())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    // 临时上传目录在启动时创建
    tokio::fs::create_dir_all(&config.tmp_dir)
        .await
        .with_context(|| format!("failed to create {}", config.tmp_dir.display()))?;

    if !config.s3.is_complete() {
        tracing::warn!("storage credentials are not configured, uploads will fail");
    }

    let addr = config.listen_addr();
    let connector = Arc::new(S3Connector::new(config.s3.clone()));
    let state = AppState::new(config, connector);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("server running on http://{}", addr);
    axum::serve(listener, app(state))
        .await
        .context("server error")?;

    Ok(())
}
