//! 路由引擎：对传输层暴露的全部操作
//!
//! 传输层（HTTP / CLI）只传入已解码的字符串，拿回普通的结果或错误。
//! 分类调用期间不持有注册表锁：classify 与 route 使用互不相干的资源。

use std::sync::Arc;

use crate::agents::{Agent, AgentRegistry, AgentStats};
use crate::classify::{Classification, ClassificationStats, IntentClassifier, IntentMapping};
use crate::core::dispatcher::{Assignment, Dispatcher};
use crate::core::error::Result;
use crate::core::stats::SystemStats;

/// 先分类再分派的结果；分类成功但分派失败时仍保留分类结果
#[derive(Debug, Clone)]
pub struct Triage {
    pub classification: Classification,
    pub assignment: Result<Assignment>,
}

pub struct RoutingEngine {
    registry: Arc<AgentRegistry>,
    dispatcher: Dispatcher,
    classifier: IntentClassifier,
}

impl RoutingEngine {
    pub fn new(registry: Arc<AgentRegistry>, classifier: IntentClassifier) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry.clone()),
            registry,
            classifier,
        }
    }

    pub async fn route(&self, intent: &str) -> Result<Assignment> {
        self.dispatcher.route(intent).await
    }

    pub async fn release(&self, agent_id: &str) -> Result<Agent> {
        self.dispatcher.release(agent_id).await
    }

    pub async fn classify(&self, message: &str) -> Result<Classification> {
        self.classifier.classify(message).await
    }

    pub async fn classify_and_route(&self, message: &str) -> Result<Triage> {
        let classification = self.classifier.classify(message).await?;
        let assignment = self.dispatcher.route(&classification.intent).await;
        Ok(Triage {
            classification,
            assignment,
        })
    }

    pub async fn get_agents(&self) -> Vec<Agent> {
        self.registry.get_all().await
    }

    pub async fn get_agent(&self, agent_id: &str) -> Option<Agent> {
        self.registry.get(agent_id).await
    }

    pub async fn set_agent_online(&self, agent_id: &str, is_online: bool) -> Result<Agent> {
        self.registry.set_online(agent_id, is_online).await
    }

    pub async fn get_agent_stats(&self) -> AgentStats {
        self.registry.get_stats().await
    }

    pub fn get_classification_stats(&self) -> ClassificationStats {
        self.classifier.stats()
    }

    pub async fn stats(&self) -> SystemStats {
        SystemStats::collect(&self.registry, &self.classifier).await
    }

    pub fn intents(&self) -> &[IntentMapping] {
        self.classifier.catalog().entries()
    }
}
