//! 路由引擎错误类型
//!
//! `NoAvailableAgent` 是正常业务结果（"稍后再试"），`ClassificationUnavailable` 是外部依赖故障；
//! 两者都不在引擎内部重试，由调用方决定重试 / 排队 / 升级。
//! 无法识别的分类标签不是错误：分类器会把它归一为 `general`。

use std::time::Duration;

use thiserror::Error;

/// 外部分类调用失败的具体原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationFailure {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// 路由 / 分类过程中可能出现的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// 没有在线、有余量且擅长该意图的坐席（对外即 ServiceUnavailable）
    #[error("no available agent for intent: {intent}")]
    NoAvailableAgent { intent: String },

    /// 请求分派到注册表中不存在的坐席，属于调用方 bug
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// 直接 assign 一个已满载的坐席
    #[error("agent at capacity: {0}")]
    AgentAtCapacity(String),

    #[error("classification unavailable: {0}")]
    ClassificationUnavailable(ClassificationFailure),

    #[error("customer message is empty")]
    EmptyMessage,

    #[error("Config error: {0}")]
    Config(String),
}

impl RouterError {
    /// 稳定的机器可读标识，供传输层写入响应体
    pub fn status(&self) -> &'static str {
        match self {
            RouterError::NoAvailableAgent { .. } => "no_agent_available",
            RouterError::UnknownAgent(_) => "unknown_agent",
            RouterError::AgentAtCapacity(_) => "agent_at_capacity",
            RouterError::ClassificationUnavailable(_) => "classification_unavailable",
            RouterError::EmptyMessage => "empty_message",
            RouterError::Config(_) => "config_error",
        }
    }

    /// 该错误是否表示"服务暂不可用，可稍后重试"
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            RouterError::NoAvailableAgent { .. } | RouterError::ClassificationUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
