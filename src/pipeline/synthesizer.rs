//! AnswerSynthesizer：把累积的 Context 与原始请求交给后端生成最终回答
//!
//! 温度 0.7；返回文本不做任何解析或校验。

use std::sync::Arc;

use crate::core::AgentError;
use crate::llm::{LlmClient, Message};
use crate::pipeline::context::Context;
use crate::pipeline::prompts::{
    context_block, synthesis_user_prompt, CONTEXT_SEPARATOR, SYNTHESIS_SYSTEM_PROMPT,
};

pub const DEFAULT_SYNTHESIS_TEMPERATURE: f32 = 0.7;

/// 按插入顺序把每条结果格式化为带 query 标题的块，并用固定分隔符连接
pub fn format_context(context: &Context) -> String {
    context
        .iter()
        .map(|(query, result)| context_block(query, result))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    temperature: f32,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            temperature: DEFAULT_SYNTHESIS_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    pub async fn synthesize(&self, request: &str, context: &Context) -> Result<String, AgentError> {
        let messages = vec![
            Message::system(SYNTHESIS_SYSTEM_PROMPT),
            Message::user(synthesis_user_prompt(request, &format_context(context))),
        ];

        tracing::info!(entries = context.len(), "synthesizing final answer");
        self.llm
            .complete(&messages, self.temperature)
            .await
            .map_err(AgentError::Synthesis)
    }
}
