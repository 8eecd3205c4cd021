//! 对话日志读取：把整段日志切分为独立对话，并取每段对话的第一句客户发言
//!
//! 日志格式：每段对话以 `"Agent: Thank you for calling` 开头的行起始；客户发言行以 `Customer: ` 开头。

use std::path::Path;

/// 新对话的起始标记
const CONVERSATION_START: &str = "\"Agent: Thank you for calling";

const CUSTOMER_PREFIX: &str = "Customer: ";

/// 切分对话（每段首尾去空白，空段丢弃）
pub fn parse_conversations(text: &str) -> Vec<String> {
    let mut conversations = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.starts_with(CONVERSATION_START) && !current.is_empty() {
            push_trimmed(&mut conversations, &current);
            current.clear();
        }
        current.push_str(line);
        current.push('\n');
    }
    push_trimmed(&mut conversations, &current);

    conversations
}

fn push_trimmed(conversations: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        conversations.push(trimmed.to_string());
    }
}

/// 从文件读取并切分对话
pub fn load_conversations(path: &Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    let conversations = parse_conversations(&text);
    tracing::info!(path = %path.display(), count = conversations.len(), "conversations loaded");
    Ok(conversations)
}

/// 第一句客户发言（去掉 `Customer: ` 前缀）
pub fn first_customer_message(conversation: &str) -> Option<&str> {
    conversation
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(CUSTOMER_PREFIX))
}

/// 每段对话的第一句客户发言，最多 limit 条；无客户发言的对话跳过
pub fn customer_messages(conversations: &[String], limit: usize) -> Vec<String> {
    conversations
        .iter()
        .filter_map(|c| first_customer_message(c))
        .take(limit)
        .map(str::to_string)
        .collect()
}
