//! LLM 客户端抽象
//!
//! 分类器只依赖 LlmClient：传入 system prompt + 用户消息，返回模型的原始文本。
//! 实现可能很慢、失败或返回任意文本，调用方负责超时与结果校验。

use async_trait::async_trait;
use thiserror::Error;

use super::Message;

/// LLM 调用失败的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// 请求无法构造（参数非法等）
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// 网络 / HTTP / API 返回错误
    #[error("transport error: {0}")]
    Transport(String),

    /// 响应结构不符合预期（无 choices、无 content）
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成，返回首条回复的文本内容
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }

    /// 后端/模型标识，仅用于日志
    fn model_name(&self) -> &str {
        "unknown"
    }
}
