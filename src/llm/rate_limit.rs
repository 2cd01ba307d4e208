//! 限速后端客户端：进程内唯一的共享句柄，所有生成调用都经过它
//!
//! 相邻两次调用之间至少间隔 min_interval；间隔从上一次调用「结束」开始计算。
//! last_call 由互斥锁保护，锁覆盖 等待 + 调用 + 记录 全过程，并发调用方会被串行化。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::llm::{LlmClient, LlmError, Message};

/// 限速客户端（在 orchestrator 中构造一次，以 Arc 注入 PlanGenerator 与 AnswerSynthesizer）
pub struct RateLimitedClient {
    inner: Arc<dyn LlmClient>,
    min_interval: Duration,
    /// 上一次调用结束的时间；None 表示尚未调用过
    last_call: Mutex<Option<Instant>>,
}

impl RateLimitedClient {
    pub fn new(inner: Arc<dyn LlmClient>, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// 调用后端；距上次调用结束不足 min_interval 时先等待剩余时间
    pub async fn invoke(&self, messages: &[Message], temperature: f32) -> Result<String, LlmError> {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::info!(
                    wait_ms = wait.as_millis() as u64,
                    "rate limiter: waiting before backend call"
                );
                sleep(wait).await;
            }
        }

        let result = self.inner.complete(messages, temperature).await;
        // 失败的调用同样占用了后端配额，也记录时间
        *last_call = Some(Instant::now());
        result
    }
}

#[async_trait]
impl LlmClient for RateLimitedClient {
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String, LlmError> {
        self.invoke(messages, temperature).await
    }

    fn token_usage(&self) -> (u64, u64, u64) {
        self.inner.token_usage()
    }
}
