//! 意图目录：意图名 -> 负责团队
//!
//! 保留条目 `general` 是兜底目标：必须存在且排在最后，不出现在发给模型的候选列表里。

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, RouterError};

/// 兜底意图名
pub const GENERAL_INTENT: &str = "general";

/// 默认兜底团队
pub const DEFAULT_FALLBACK_TEAM: &str = "general-agent";

/// 目录中的一条映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentMapping {
    pub name: String,
    pub team: String,
}

impl IntentMapping {
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
        }
    }
}

/// 校验过的意图目录（顺序保留，general 恒在末尾）
#[derive(Debug, Clone)]
pub struct IntentCatalog {
    entries: Vec<IntentMapping>,
}

impl IntentCatalog {
    /// 名称去空白后不可为空、不可重复；缺 general 时补上，general 不在末尾时移到末尾
    pub fn new(mappings: Vec<IntentMapping>, fallback_team: &str) -> Result<Self> {
        let mut entries: Vec<IntentMapping> = Vec::with_capacity(mappings.len() + 1);
        let mut general: Option<IntentMapping> = None;

        for mapping in mappings {
            let name = mapping.name.trim();
            if name.is_empty() {
                return Err(RouterError::Config("intent name must not be empty".to_string()));
            }
            let duplicate = entries.iter().any(|e| e.name == name)
                || (name == GENERAL_INTENT && general.is_some());
            if duplicate {
                return Err(RouterError::Config(format!("duplicate intent: {name}")));
            }

            let mapping = IntentMapping::new(name, mapping.team.trim());
            if name == GENERAL_INTENT {
                general = Some(mapping);
            } else {
                entries.push(mapping);
            }
        }

        // general 恒解析到配置的兜底团队
        let mut general = general.unwrap_or_else(|| IntentMapping::new(GENERAL_INTENT, fallback_team));
        general.team = fallback_team.to_string();
        entries.push(general);

        Ok(Self { entries })
    }

    /// 全部条目（含末尾的 general）
    pub fn entries(&self) -> &[IntentMapping] {
        &self.entries
    }

    /// 发给模型的具体意图（不含 general）
    pub fn specific_intents(&self) -> impl Iterator<Item = &str> {
        self.entries[..self.entries.len() - 1]
            .iter()
            .map(|e| e.name.as_str())
    }

    /// 按意图名精确查找（区分大小写）
    pub fn get(&self, intent: &str) -> Option<&IntentMapping> {
        self.entries.iter().find(|e| e.name == intent)
    }

    /// 意图对应的团队；未知意图落到兜底团队
    pub fn team_for(&self, intent: &str) -> &str {
        self.get(intent)
            .map(|e| e.team.as_str())
            .unwrap_or_else(|| self.fallback_team())
    }

    pub fn fallback_team(&self) -> &str {
        // new() 保证末尾是 general
        &self.entries[self.entries.len() - 1].team
    }

    /// 分类用的 system prompt
    pub fn build_prompt(&self) -> String {
        let intent_list = self.specific_intents().collect::<Vec<_>>().join(", ");
        format!(
            "You are a customer service query classifier.\n\
             Classify the following customer message into exactly ONE of these specific intents: {intent_list}\n\
             \n\
             If the message doesn't clearly fit into any of these specific categories, respond with \"{GENERAL_INTENT}\".\n\
             \n\
             Respond with only the intent name, nothing else."
        )
    }
}

/// 默认意图目录（未配置 [classification] intents 时使用）
pub fn default_intents() -> Vec<IntentMapping> {
    [
        ("account_access_issues", "account-support"),
        ("billing_discrepancies", "billing-team"),
        ("delivery_problems", "logistics-team"),
        ("installation_support_requests", "technical-support"),
        ("order_cancellation_requests", "order-management"),
        ("order_status_uncertainty", "order-tracking"),
        ("product_availability_inquiries", "inventory-team"),
        ("refund_processing_issues", "finance-team"),
        ("return_process_inquiries", "returns-team"),
        ("warranty_terms_inquiries", "warranty-team"),
        (GENERAL_INTENT, DEFAULT_FALLBACK_TEAM),
    ]
    .into_iter()
    .map(|(name, team)| IntentMapping::new(name, team))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> IntentCatalog {
        IntentCatalog::new(default_intents(), DEFAULT_FALLBACK_TEAM).unwrap()
    }

    #[test]
    fn test_general_last_and_excluded_from_prompt_list() {
        let catalog = catalog();
        assert_eq!(catalog.entries().len(), 11);
        assert_eq!(catalog.entries().last().unwrap().name, GENERAL_INTENT);
        assert_eq!(catalog.specific_intents().count(), 10);
        assert!(catalog.specific_intents().all(|i| i != GENERAL_INTENT));
    }

    #[test]
    fn test_general_moved_to_end_and_appended_when_missing() {
        let moved = IntentCatalog::new(
            vec![
                IntentMapping::new(GENERAL_INTENT, "x"),
                IntentMapping::new("billing_discrepancies", "billing-team"),
            ],
            "fallback",
        )
        .unwrap();
        let names: Vec<&str> = moved.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["billing_discrepancies", GENERAL_INTENT]);
        assert_eq!(moved.fallback_team(), "fallback");

        let appended = IntentCatalog::new(
            vec![IntentMapping::new("delivery_problems", "logistics-team")],
            "fallback",
        )
        .unwrap();
        assert_eq!(appended.team_for(GENERAL_INTENT), "fallback");
    }

    #[test]
    fn test_rejects_duplicates_and_blank_names() {
        let dup = vec![
            IntentMapping::new("a", "t1"),
            IntentMapping::new("a", "t2"),
        ];
        assert!(IntentCatalog::new(dup, "f").is_err());

        let blank = vec![IntentMapping::new("  ", "t")];
        assert!(IntentCatalog::new(blank, "f").is_err());
    }

    #[test]
    fn test_team_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.team_for("billing_discrepancies"), "billing-team");
        assert_eq!(catalog.team_for(GENERAL_INTENT), DEFAULT_FALLBACK_TEAM);
        assert_eq!(catalog.team_for("nonsense"), DEFAULT_FALLBACK_TEAM);
        assert_eq!(
            catalog.get("warranty_terms_inquiries").map(|e| e.team.as_str()),
            Some("warranty-team")
        );
        assert!(catalog.get("Warranty_Terms_Inquiries").is_none());
    }

    #[test]
    fn test_prompt_lists_specific_intents_only() {
        let prompt = catalog().build_prompt();
        assert!(prompt.contains(
            "account_access_issues, billing_discrepancies, delivery_problems"
        ));
        assert!(prompt.contains("warranty_terms_inquiries\n"));
        assert!(prompt.contains("respond with \"general\""));
        assert!(!prompt.contains("warranty_terms_inquiries, general"));
    }
}
