//! 坐席注册表
//!
//! 名单在构造时确定，之后只改负载与在线状态。所有读改写都在同一把 RwLock 下完成：
//! `reserve` 持有写锁完成"查找 + 计数"，并发调用不会把同一坐席推过容量上限。

use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::RwLock;

use super::Agent;
use crate::core::error::{Result, RouterError};

/// 注册表汇总统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStats {
    pub total_agents: usize,
    pub online_agents: usize,
    pub offline_agents: usize,
    pub total_capacity: u64,
    pub current_load: u64,
    /// current_load / total_capacity；容量为 0 时为 0
    pub utilization: f64,
}

/// 坐席注册表：按 id 升序保存，候选按 id 升序选取
pub struct AgentRegistry {
    agents: RwLock<BTreeMap<String, Agent>>,
}

impl AgentRegistry {
    /// 校验名单：id 不可重复、不可为空，max_capacity 必须为正
    pub fn new(roster: Vec<Agent>) -> Result<Self> {
        let mut agents = BTreeMap::new();
        for agent in roster {
            if agent.id.trim().is_empty() {
                return Err(RouterError::Config("agent id must not be empty".to_string()));
            }
            if agent.max_capacity == 0 {
                return Err(RouterError::Config(format!(
                    "agent {} has max_capacity 0",
                    agent.id
                )));
            }
            if agents.contains_key(&agent.id) {
                return Err(RouterError::Config(format!("duplicate agent id: {}", agent.id)));
            }
            agents.insert(agent.id.clone(), agent);
        }

        tracing::info!(agents = agents.len(), "agent registry initialized");
        Ok(Self {
            agents: RwLock::new(agents),
        })
    }

    /// 查找可用坐席（只读，不占用容量）
    pub async fn find_available_agent(&self, intent: &str) -> Result<Agent> {
        let agents = self.agents.read().await;
        first_candidate(&agents, intent)
            .cloned()
            .ok_or_else(|| RouterError::NoAvailableAgent {
                intent: intent.to_string(),
            })
    }

    /// 负载 +1；未知 id 返回 UnknownAgent，已满载返回 AgentAtCapacity
    pub async fn assign(&self, agent_id: &str) -> Result<Agent> {
        let mut agents = self.agents.write().await;
        let agent = agents
            .get_mut(agent_id)
            .ok_or_else(|| RouterError::UnknownAgent(agent_id.to_string()))?;
        if !agent.has_capacity() {
            return Err(RouterError::AgentAtCapacity(agent_id.to_string()));
        }
        agent.current_load += 1;
        tracing::debug!(agent_id, load = agent.current_load, "agent assigned");
        Ok(agent.clone())
    }

    /// 查找 + 分派，整体在一次写锁内完成
    pub async fn reserve(&self, intent: &str) -> Result<Agent> {
        let mut agents = self.agents.write().await;
        let agent_id = first_candidate(&agents, intent)
            .map(|a| a.id.clone())
            .ok_or_else(|| RouterError::NoAvailableAgent {
                intent: intent.to_string(),
            })?;

        let agent = agents
            .get_mut(&agent_id)
            .ok_or_else(|| RouterError::UnknownAgent(agent_id.clone()))?;
        agent.current_load += 1;
        Ok(agent.clone())
    }

    /// 负载 -1（查询处理完毕），最低到 0
    pub async fn release(&self, agent_id: &str) -> Result<Agent> {
        let mut agents = self.agents.write().await;
        let agent = agents
            .get_mut(agent_id)
            .ok_or_else(|| RouterError::UnknownAgent(agent_id.to_string()))?;
        agent.current_load = agent.current_load.saturating_sub(1);
        tracing::debug!(agent_id, load = agent.current_load, "agent released");
        Ok(agent.clone())
    }

    /// 上线 / 下线
    pub async fn set_online(&self, agent_id: &str, is_online: bool) -> Result<Agent> {
        let mut agents = self.agents.write().await;
        let agent = agents
            .get_mut(agent_id)
            .ok_or_else(|| RouterError::UnknownAgent(agent_id.to_string()))?;
        agent.is_online = is_online;
        tracing::info!(agent_id, is_online, "agent availability changed");
        Ok(agent.clone())
    }

    pub async fn get(&self, agent_id: &str) -> Option<Agent> {
        self.agents.read().await.get(agent_id).cloned()
    }

    /// 全部坐席快照，按 id 升序
    pub async fn get_all(&self) -> Vec<Agent> {
        self.agents.read().await.values().cloned().collect()
    }

    pub async fn get_stats(&self) -> AgentStats {
        let agents = self.agents.read().await;
        let total_agents = agents.len();
        let online_agents = agents.values().filter(|a| a.is_online).count();
        let total_capacity: u64 = agents.values().map(|a| u64::from(a.max_capacity)).sum();
        let current_load: u64 = agents.values().map(|a| u64::from(a.current_load)).sum();

        let utilization = if total_capacity == 0 {
            0.0
        } else {
            current_load as f64 / total_capacity as f64
        };

        AgentStats {
            total_agents,
            online_agents,
            offline_agents: total_agents - online_agents,
            total_capacity,
            current_load,
            utilization,
        }
    }
}

fn first_candidate<'a>(agents: &'a BTreeMap<String, Agent>, intent: &str) -> Option<&'a Agent> {
    agents.values().find(|a| a.is_available_for(intent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::default_roster;

    fn single(max: u32) -> AgentRegistry {
        AgentRegistry::new(vec![
            Agent::new("A", "Agent A", max).with_specialties(["billing_discrepancies"]),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_picks_lowest_id() {
        let registry = AgentRegistry::new(vec![
            Agent::new("zeta", "Z", 3).with_specialties(["delivery_problems"]),
            Agent::new("alpha", "A", 3).with_specialties(["delivery_problems"]),
            Agent::new("mid", "M", 3).with_specialties(["delivery_problems"]),
        ])
        .unwrap();

        for _ in 0..3 {
            let agent = registry.find_available_agent("delivery_problems").await.unwrap();
            assert_eq!(agent.id, "alpha");
        }
    }

    #[tokio::test]
    async fn test_find_skips_offline_and_full() {
        let registry = AgentRegistry::new(default_roster()).unwrap();

        // account-helper 已满载
        let err = registry
            .find_available_agent("account_access_issues")
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::NoAvailableAgent { .. }));

        // tech-support 离线
        assert!(registry
            .find_available_agent("installation_support_requests")
            .await
            .is_err());

        let agent = registry
            .find_available_agent("refund_processing_issues")
            .await
            .unwrap();
        assert_eq!(agent.id, "billing-specialist");
    }

    #[tokio::test]
    async fn test_find_does_not_change_load() {
        let registry = single(1);
        registry.find_available_agent("billing_discrepancies").await.unwrap();
        assert_eq!(registry.get("A").await.unwrap().current_load, 0);
    }

    #[tokio::test]
    async fn test_assign_unknown_agent() {
        let registry = single(1);
        let err = registry.assign("ghost").await.unwrap_err();
        assert_eq!(err, RouterError::UnknownAgent("ghost".to_string()));
        assert_eq!(registry.get_stats().await.current_load, 0);
    }

    #[tokio::test]
    async fn test_assign_refuses_over_capacity() {
        let registry = single(1);
        assert_eq!(registry.assign("A").await.unwrap().current_load, 1);
        let err = registry.assign("A").await.unwrap_err();
        assert_eq!(err, RouterError::AgentAtCapacity("A".to_string()));
        assert_eq!(registry.get("A").await.unwrap().current_load, 1);
    }

    #[tokio::test]
    async fn test_reserve_exhausts_capacity() {
        let registry = single(2);
        registry.reserve("billing_discrepancies").await.unwrap();
        registry.reserve("billing_discrepancies").await.unwrap();
        let err = registry.reserve("billing_discrepancies").await.unwrap_err();
        assert!(matches!(err, RouterError::NoAvailableAgent { ref intent } if intent == "billing_discrepancies"));
        assert_eq!(registry.get("A").await.unwrap().current_load, 2);
    }

    #[tokio::test]
    async fn test_release_frees_slot_and_saturates() {
        let registry = single(1);
        registry.reserve("billing_discrepancies").await.unwrap();
        assert_eq!(registry.release("A").await.unwrap().current_load, 0);
        assert_eq!(registry.release("A").await.unwrap().current_load, 0);
        assert!(registry.reserve("billing_discrepancies").await.is_ok());
        assert!(matches!(
            registry.release("ghost").await,
            Err(RouterError::UnknownAgent(_))
        ));
    }

    #[tokio::test]
    async fn test_set_online() {
        let registry = single(1);
        registry.set_online("A", false).await.unwrap();
        assert!(registry.reserve("billing_discrepancies").await.is_err());
        registry.set_online("A", true).await.unwrap();
        assert!(registry.reserve("billing_discrepancies").await.is_ok());
    }

    #[tokio::test]
    async fn test_get_all_sorted_by_id() {
        let registry = AgentRegistry::new(default_roster()).unwrap();
        let ids: Vec<String> = registry.get_all().await.into_iter().map(|a| a.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 7);
    }

    #[tokio::test]
    async fn test_stats_default_roster() {
        let registry = AgentRegistry::new(default_roster()).unwrap();
        let stats = registry.get_stats().await;
        assert_eq!(stats.total_agents, 7);
        assert_eq!(stats.online_agents, 6);
        assert_eq!(stats.offline_agents, 1);
        assert_eq!(stats.total_capacity, 30);
        assert_eq!(stats.current_load, 9);
        assert!((stats.utilization - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_stats_empty_registry() {
        let registry = AgentRegistry::new(Vec::new()).unwrap();
        let stats = registry.get_stats().await;
        assert_eq!(stats.total_capacity, 0);
        assert_eq!(stats.utilization, 0.0);
    }

    #[test]
    fn test_rejects_invalid_roster() {
        let dup = vec![Agent::new("a", "A", 1), Agent::new("a", "B", 1)];
        assert!(matches!(AgentRegistry::new(dup), Err(RouterError::Config(_))));

        let zero = vec![Agent::new("a", "A", 0)];
        assert!(matches!(AgentRegistry::new(zero), Err(RouterError::Config(_))));
    }
}
