//! 分类指标：进程级无锁计数器

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// 分类统计快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationStats {
    /// 发起过外部调用的请求数（含失败）
    pub total_requests: u64,
    pub failed_requests: u64,
    /// 模型输出无法识别、归一为 general 的次数
    pub fallback_count: u64,
    /// 外部调用累计耗时（毫秒）
    pub total_latency_ms: f64,
    /// total_latency_ms / total_requests；无请求时为 0
    pub avg_latency_ms: f64,
    pub total_tokens: u64,
}

#[derive(Debug, Default)]
pub struct ClassificationMetrics {
    total_requests: AtomicU64,
    failed_requests: AtomicU64,
    fallback_count: AtomicU64,
    total_latency_micros: AtomicU64,
}

impl ClassificationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次外部调用，返回该请求的序号（从 1 开始）
    ///
    /// 先累加耗时再以 Release 计数，snapshot 以 Acquire 读到的每个请求都已带上自己的耗时。
    pub fn record_call(&self, latency: Duration) -> u64 {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.total_latency_micros.fetch_add(micros, Ordering::Relaxed);
        self.total_requests.fetch_add(1, Ordering::Release) + 1
    }

    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallback_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, total_tokens: u64) -> ClassificationStats {
        // 必须先读计数：耗时可能多于已计数请求，但不会缺
        let total_requests = self.total_requests.load(Ordering::Acquire);
        let total_latency_ms =
            self.total_latency_micros.load(Ordering::Relaxed) as f64 / 1000.0;
        let avg_latency_ms = if total_requests == 0 {
            0.0
        } else {
            total_latency_ms / total_requests as f64
        };

        ClassificationStats {
            total_requests,
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            fallback_count: self.fallback_count.load(Ordering::Relaxed),
            total_latency_ms,
            avg_latency_ms,
            total_tokens,
        }
    }
}
