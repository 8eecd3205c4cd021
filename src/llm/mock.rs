//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按预设脚本应答：固定文本、固定错误、或延迟后应答（用于测超时）。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{LlmClient, LlmError, Message, Role};

/// Mock 的应答方式
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Reply(String),
    Fail(LlmError),
    Delayed(Duration, String),
}

/// Mock 客户端：记录调用次数与最近一次的 system prompt
#[derive(Debug)]
pub struct MockLlmClient {
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_system_prompt: Mutex<Option<String>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::replying("general")
    }
}

impl MockLlmClient {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_system_prompt: Mutex::new(None),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(text.into()))
    }

    pub fn failing(error: LlmError) -> Self {
        Self::new(MockBehavior::Fail(error))
    }

    pub fn delayed(delay: Duration, text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Delayed(delay, text.into()))
    }

    /// 已收到的 complete 调用次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn last_system_prompt(&self) -> Option<String> {
        self.last_system_prompt.lock().await.clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone());
        *self.last_system_prompt.lock().await = system;

        match &self.behavior {
            MockBehavior::Reply(text) => Ok(text.clone()),
            MockBehavior::Fail(err) => Err(err.clone()),
            MockBehavior::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
