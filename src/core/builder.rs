//! 引擎构建器：从 AppConfig 组装注册表、分类器与分派器
//!
//! 未注入 LLM 时按配置创建 OpenAI 兼容客户端，此时缺少 API Key 属于配置错误。

use std::sync::Arc;

use crate::agents::AgentRegistry;
use crate::classify::{IntentCatalog, IntentClassifier};
use crate::config::AppConfig;
use crate::core::engine::RoutingEngine;
use crate::core::error::Result;
use crate::llm::{LlmClient, OpenAiClient, SamplingParams};

pub struct EngineBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
}

impl EngineBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config, llm: None }
    }

    /// 注入 LLM 客户端（测试用 MockLlmClient）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    fn build_llm(&self) -> Result<Arc<dyn LlmClient>> {
        let api_key = self.config.api_key()?;
        let llm = &self.config.llm;
        tracing::info!(provider = %llm.provider, model = %llm.model, "creating LLM client");
        Ok(Arc::new(OpenAiClient::new(
            llm.base_url.as_deref(),
            &llm.model,
            &api_key,
            SamplingParams {
                temperature: llm.temperature,
                max_tokens: llm.max_tokens,
            },
        )))
    }

    pub fn build(self) -> Result<RoutingEngine> {
        let llm = match &self.llm {
            Some(llm) => llm.clone(),
            None => self.build_llm()?,
        };

        let registry = Arc::new(AgentRegistry::new(self.config.routing.agents.clone())?);
        let catalog = IntentCatalog::new(
            self.config.classification.intents.clone(),
            &self.config.classification.fallback_team,
        )?;
        let classifier = IntentClassifier::new(llm, catalog, self.config.request_timeout());

        Ok(RoutingEngine::new(registry, classifier))
    }
}
