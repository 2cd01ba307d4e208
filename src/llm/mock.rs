//! Mock LLM 客户端（无需 API）
//!
//! - MockLlmClient：离线运行用。规划请求返回单步 search_lore 计划，综合请求回显上下文。
//! - ScriptedLlmClient：测试替身。按顺序返回预设结果，并记录每次调用的消息与温度。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, Message, Role};

/// system 消息含此指令时，Mock 视其为规划请求并回复 JSON 步骤数组
pub const JSON_ONLY_MARKER: &str = "Responda APENAS com o JSON";

/// 离线 Mock 客户端
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message], _temperature: f32) -> Result<String, LlmError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        let is_planning = messages
            .iter()
            .any(|m| m.role == Role::System && m.content.contains(JSON_ONLY_MARKER));

        if is_planning {
            let step = serde_json::json!([{ "tool": "search_lore", "query": last_user.trim() }]);
            return Ok(step.to_string());
        }

        Ok(format!("Resposta (mock):\n{}", last_user.trim()))
    }
}

/// 一次被记录的调用
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub temperature: f32,
}

/// 脚本化客户端：预设结果用尽后返回 Api 错误
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedLlmClient {
    pub fn new(replies: impl IntoIterator<Item = Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                messages: messages.to_vec(),
                temperature,
            });
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Api("no scripted reply left".to_string())))
    }
}
