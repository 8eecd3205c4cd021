//! 分派器：把"查找坐席 + 记一次分派"当作一个不可分的动作
//!
//! 要么恰好分给一个坐席，要么返回 NoAvailableAgent；不存在"占了坐席但没计数"的中间态。
//! 不做内部重试与排队，由调用方决定稍后重试还是升级。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::agents::{Agent, AgentRegistry};
use crate::core::error::Result;

/// 一次分派结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub agent_id: String,
    pub intent: String,
    pub assigned_at: DateTime<Utc>,
}

pub struct Dispatcher {
    registry: Arc<AgentRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }

    pub async fn route(&self, intent: &str) -> Result<Assignment> {
        match self.registry.reserve(intent).await {
            Ok(agent) => {
                tracing::info!(
                    intent,
                    agent_id = %agent.id,
                    load = agent.current_load,
                    capacity = agent.max_capacity,
                    "query routed"
                );
                Ok(Assignment {
                    agent_id: agent.id,
                    intent: intent.to_string(),
                    assigned_at: Utc::now(),
                })
            }
            Err(err) => {
                tracing::info!(intent, error = %err, "query not routed");
                Err(err)
            }
        }
    }

    /// 查询处理完毕，释放坐席的一个名额
    pub async fn release(&self, agent_id: &str) -> Result<Agent> {
        let agent = self.registry.release(agent_id).await?;
        tracing::info!(agent_id, load = agent.current_load, "assignment released");
        Ok(agent)
    }
}
