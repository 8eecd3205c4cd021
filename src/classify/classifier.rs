//! 意图分类器
//!
//! 每次分类只调用一次外部模型，并用超时兜住；模型输出去空白后必须与目录中的意图名完全一致，
//! 否则归一为 `general`。外部调用失败（超时 / 网络 / 响应格式）直接返回 ClassificationUnavailable，
//! 不会悄悄降级为 general。每次分类输出一条结构化日志（request_id、耗时、结果）。

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::catalog::{IntentCatalog, GENERAL_INTENT};
use super::metrics::{ClassificationMetrics, ClassificationStats};
use crate::core::error::{ClassificationFailure, Result, RouterError};
use crate::llm::{LlmClient, LlmError, Message};

/// 分类结果：intent 恒为目录中的某个意图名
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub intent: String,
    pub team: String,
}

pub struct IntentClassifier {
    llm: Arc<dyn LlmClient>,
    catalog: IntentCatalog,
    /// 目录固定，prompt 构造一次复用
    prompt: String,
    timeout: Duration,
    metrics: ClassificationMetrics,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, catalog: IntentCatalog, timeout: Duration) -> Self {
        let prompt = catalog.build_prompt();
        tracing::info!(
            intents = catalog.specific_intents().count(),
            model = llm.model_name(),
            timeout_ms = timeout.as_millis() as u64,
            "intent classifier initialized"
        );
        Self {
            llm,
            catalog,
            prompt,
            timeout,
            metrics: ClassificationMetrics::new(),
        }
    }

    pub async fn classify(&self, message: &str) -> Result<Classification> {
        if message.trim().is_empty() {
            return Err(RouterError::EmptyMessage);
        }

        let request_id = uuid::Uuid::new_v4();
        let messages = [Message::system(self.prompt.as_str()), Message::user(message)];

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.llm.complete(&messages)).await;
        let latency = started.elapsed();
        let seq = self.metrics.record_call(latency);
        let latency_ms = latency.as_millis() as u64;

        let raw = match outcome {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => {
                let failure = match err {
                    LlmError::MalformedResponse(msg) => ClassificationFailure::MalformedResponse(msg),
                    LlmError::Transport(msg) | LlmError::InvalidRequest(msg) => {
                        ClassificationFailure::Transport(msg)
                    }
                };
                return Err(self.fail(request_id, seq, latency_ms, failure));
            }
            Err(_) => {
                let failure = ClassificationFailure::Timeout(self.timeout);
                return Err(self.fail(request_id, seq, latency_ms, failure));
            }
        };

        let (intent, fallback) = self.normalize_label(&raw);
        if fallback {
            self.metrics.record_fallback();
        }
        let team = self.catalog.team_for(intent).to_string();
        let outcome = if fallback { "fallback" } else { "classified" };

        tracing::info!(
            request_id = %request_id,
            seq,
            latency_ms,
            outcome,
            intent,
            team = %team,
            "classification completed"
        );

        Ok(Classification {
            intent: intent.to_string(),
            team,
        })
    }

    /// 去空白后精确匹配目录；匹配不上返回 (general, true)
    pub fn normalize_label<'a>(&'a self, raw: &str) -> (&'a str, bool) {
        let label = raw.trim();
        match self.catalog.get(label) {
            Some(entry) => (entry.name.as_str(), false),
            None => (GENERAL_INTENT, true),
        }
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    pub fn stats(&self) -> ClassificationStats {
        let (_, _, total_tokens) = self.llm.token_usage();
        self.metrics.snapshot(total_tokens)
    }

    fn fail(
        &self,
        request_id: uuid::Uuid,
        seq: u64,
        latency_ms: u64,
        failure: ClassificationFailure,
    ) -> RouterError {
        self.metrics.record_failure();
        tracing::warn!(
            request_id = %request_id,
            seq,
            latency_ms,
            outcome = "unavailable",
            error = %failure,
            "classification failed"
        );
        RouterError::ClassificationUnavailable(failure)
    }
}
