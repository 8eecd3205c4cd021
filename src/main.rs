//! Query Router CLI
//!
//! 入口：初始化日志、加载配置、构建路由引擎，然后执行单条子命令。
//! 缺少 API Key 时直接退出（启动期配置错误）。

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use serde_json::json;

use query_router::config::load_config;
use query_router::conversation::{customer_messages, load_conversations};
use query_router::{observability, EngineBuilder, RoutingEngine};

#[derive(Parser)]
#[command(name = "query-router")]
#[command(version)]
#[command(about = "Route customer queries to agents by intent and capacity")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single customer message
    Classify {
        message: String,
    },

    /// Route an already-known intent to an agent
    Route {
        intent: String,
    },

    /// Classify the first customer line of each conversation in a log file
    Batch {
        /// Conversation log; defaults to app.conversations_path
        file: Option<PathBuf>,

        #[arg(short, long, default_value_t = 5)]
        limit: usize,

        /// Also route each classified intent
        #[arg(long)]
        route: bool,
    },

    /// List agents and their load
    Agents,

    /// Show agent and classification statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.clone()).context("Failed to load config")?;
    tracing::debug!(app = config.app_name(), "config loaded");
    let conversations_path = config.app.conversations_path.clone();
    let engine = EngineBuilder::new(config)
        .build()
        .context("Failed to build routing engine")?;

    match cli.command {
        Commands::Classify { message } => cmd_classify(&engine, &message).await,
        Commands::Route { intent } => cmd_route(&engine, &intent).await,
        Commands::Batch { file, limit, route } => {
            let path = file
                .or(conversations_path)
                .context("No conversation file given and app.conversations_path is not set")?;
            cmd_batch(&engine, path, limit, route).await
        }
        Commands::Agents => print_json(&engine.get_agents().await),
        Commands::Stats => print_json(&engine.stats().await),
    }
}

async fn cmd_classify(engine: &RoutingEngine, message: &str) -> Result<()> {
    let classification = engine.classify(message).await?;
    print_json(&json!({
        "intent": classification.intent,
        "recommended_agent": classification.team,
        "message": message,
    }))
}

/// 分派失败时仍输出 JSON，但以非零码退出，脚本可据此判断
async fn cmd_route(engine: &RoutingEngine, intent: &str) -> Result<()> {
    match engine.route(intent).await {
        Ok(assignment) => print_json(&assignment),
        Err(err) => {
            print_json(&json!({ "error": err.to_string(), "status": err.status() }))?;
            Err(err).with_context(|| format!("Failed to route intent: {intent}"))
        }
    }
}

async fn cmd_batch(engine: &RoutingEngine, path: PathBuf, limit: usize, route: bool) -> Result<()> {
    let conversations = load_conversations(&path)
        .with_context(|| format!("Failed to read conversations: {}", path.display()))?;
    let messages = customer_messages(&conversations, limit);

    let results = join_all(messages.iter().enumerate().map(|(i, message)| async move {
        let mut result = json!({
            "conversation_id": i + 1,
            "customer_message": message,
        });
        match engine.classify(message).await {
            Ok(classification) => {
                result["classified_intent"] = json!(classification.intent);
                result["recommended_agent"] = json!(classification.team);
                if route {
                    result["routing"] = match engine.route(&classification.intent).await {
                        Ok(assignment) => json!(assignment),
                        Err(err) => json!({ "error": err.to_string(), "status": err.status() }),
                    };
                }
            }
            Err(err) => result["error"] = json!(err.to_string()),
        }
        result
    }))
    .await;

    print_json(&json!({
        "total_conversations": conversations.len(),
        "total_tested": results.len(),
        "results": results,
    }))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
