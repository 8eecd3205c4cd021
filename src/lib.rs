//! Query Router - 客服查询路由
//!
//! 模块划分：
//! - **agents**: 坐席模型、默认名单与带容量校验的注册表
//! - **classify**: 意图目录、LLM 意图分类器（含 general 兜底）与分类指标
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **conversation**: 对话日志切分与客户首句提取
//! - **core**: 错误类型、分派器、统计汇总、引擎门面与构建器
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **observability**: 日志初始化
//! - **web**: HTTP 传输层（feature = "web"）

pub mod agents;
pub mod classify;
pub mod config;
pub mod conversation;
pub mod core;
pub mod llm;
pub mod observability;
#[cfg(feature = "web")]
pub mod web;

pub use crate::core::{Assignment, EngineBuilder, RouterError, RoutingEngine};
