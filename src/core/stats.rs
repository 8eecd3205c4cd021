//! 统计汇总：注册表统计 + 分类统计的只读投影

use serde::Serialize;

use crate::agents::{AgentRegistry, AgentStats};
use crate::classify::{ClassificationStats, IntentClassifier};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStats {
    pub agents: AgentStats,
    pub classification: ClassificationStats,
}

impl SystemStats {
    pub async fn collect(registry: &AgentRegistry, classifier: &IntentClassifier) -> Self {
        Self {
            agents: registry.get_stats().await,
            classification: classifier.stats(),
        }
    }
}
