//! 坐席：模型、默认名单与注册表
//!
//! 坐席状态（负载 / 在线）只归 AgentRegistry 所有；对外只暴露按值拷贝的快照。

pub mod registry;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use registry::{AgentRegistry, AgentStats};

/// 单个坐席
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    /// 能处理的意图标签
    pub specialties: BTreeSet<String>,
    /// 并发处理上限（正整数）
    pub max_capacity: u32,
    /// 当前处理中的查询数；初始化时可能 >= max_capacity
    #[serde(default)]
    pub current_load: u32,
    #[serde(default = "default_online")]
    pub is_online: bool,
}

fn default_online() -> bool {
    true
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialties: BTreeSet::new(),
            max_capacity,
            current_load: 0,
            is_online: true,
        }
    }

    pub fn with_specialties<I, S>(mut self, specialties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specialties = specialties.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_load(mut self, current_load: u32) -> Self {
        self.current_load = current_load;
        self
    }

    pub fn with_online(mut self, is_online: bool) -> Self {
        self.is_online = is_online;
        self
    }

    pub fn can_handle(&self, intent: &str) -> bool {
        self.specialties.contains(intent)
    }

    pub fn has_capacity(&self) -> bool {
        self.current_load < self.max_capacity
    }

    /// 候选条件：擅长该意图、在线、且还有余量
    pub fn is_available_for(&self, intent: &str) -> bool {
        self.can_handle(intent) && self.is_online && self.has_capacity()
    }
}

/// 默认坐席名单（未配置 [routing] agents 时使用）
pub fn default_roster() -> Vec<Agent> {
    vec![
        Agent::new("billing-specialist", "Sarah - Billing Expert", 5)
            .with_specialties(["billing_discrepancies", "refund_processing_issues"])
            .with_load(2),
        Agent::new("account-helper", "Mike - Account Support", 3)
            .with_specialties(["account_access_issues"])
            .with_load(3),
        Agent::new("delivery-tracker", "Emma - Delivery Support", 4)
            .with_specialties(["delivery_problems", "order_status_uncertainty"])
            .with_load(1),
        Agent::new("product-expert", "Alex - Product Specialist", 6)
            .with_specialties(["product_quality_concerns", "product_availability_inquiries"]),
        Agent::new("returns-processor", "Jordan - Returns & Exchanges", 4)
            .with_specialties(["return_process_inquiries", "order_cancellation_requests"])
            .with_load(2),
        Agent::new("warranty-advisor", "Taylor - Warranty Support", 3)
            .with_specialties(["warranty_terms_inquiries"])
            .with_load(1),
        // 维护中
        Agent::new("tech-support", "Casey - Technical Support", 5)
            .with_specialties(["installation_support_requests"])
            .with_online(false),
    ]
}
