//! Query Router HTTP 服务
//!
//! 启动: cargo run --bin query-router-web --features web
//! 监听地址取 [web] bind（默认 127.0.0.1:8080），浏览器页面取 [web] static_dir

#![cfg(feature = "web")]

use std::sync::Arc;

use anyhow::Context;

use query_router::config::load_config;
use query_router::conversation::load_conversations;
use query_router::web::{router, AppState};
use query_router::{observability, EngineBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let bind = cfg.web.bind.clone();
    let static_dir = cfg.web.static_dir.clone();
    let app_name = cfg.app_name().to_string();

    // 对话日志可选；读不到只影响测试端点
    let conversations = match &cfg.app.conversations_path {
        Some(path) => load_conversations(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to load conversations");
            Vec::new()
        }),
        None => Vec::new(),
    };

    let engine = EngineBuilder::new(cfg)
        .build()
        .context("Failed to build routing engine")?;

    let app = router(
        AppState {
            engine: Arc::new(engine),
            conversations: Arc::new(conversations),
        },
        &static_dir,
    );

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!(app = %app_name, addr = %bind, static_dir = %static_dir.display(), "query router listening");
    axum::serve(listener, app).await?;

    Ok(())
}
