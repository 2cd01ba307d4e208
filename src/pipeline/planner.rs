//! PlanGenerator：把 (请求, 领域) 交给后端生成计划并解析
//!
//! 规划使用温度 0（确定性输出）；后端失败 → PlanGeneration，输出无法解析 → PlanParse / PlanSchema。

use std::sync::Arc;

use crate::core::AgentError;
use crate::llm::{LlmClient, Message};
use crate::pipeline::plan::{parse_plan, Plan};
use crate::pipeline::prompts::{plan_user_prompt, PLAN_SYSTEM_PROMPT};

pub const DEFAULT_PLAN_TEMPERATURE: f32 = 0.0;

pub struct PlanGenerator {
    llm: Arc<dyn LlmClient>,
    temperature: f32,
}

impl PlanGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            temperature: DEFAULT_PLAN_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    pub async fn create_plan(&self, request: &str, domain: &str) -> Result<Plan, AgentError> {
        let messages = vec![
            Message::system(PLAN_SYSTEM_PROMPT),
            Message::user(plan_user_prompt(request, domain)),
        ];

        tracing::info!(domain = %domain, "generating plan");
        let raw = self
            .llm
            .complete(&messages, self.temperature)
            .await
            .map_err(AgentError::PlanGeneration)?;

        let plan = parse_plan(&raw)?;
        tracing::info!(steps = plan.len(), "plan generated");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockLlmClient, Role, ScriptedLlmClient};

    #[tokio::test]
    async fn test_create_plan_sends_fixed_template_at_zero_temperature() {
        let llm = Arc::new(ScriptedLlmClient::with_replies(&[
            "```json\n[{\"tool\": \"search_lore\", \"query\": \"Vectora\"}]\n```",
        ]));
        let planner = PlanGenerator::new(llm.clone());

        let plan = planner.create_plan("Crie um anão", "Tormenta20").await.unwrap();
        assert_eq!(plan.len(), 1);

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, 0.0);
        assert_eq!(calls[0].messages[0].role, Role::System);
        assert_eq!(calls[0].messages[0].content, PLAN_SYSTEM_PROMPT);
        assert_eq!(
            calls[0].messages[1].content,
            "Pedido: \"Crie um anão\"\nSistema: \"Tormenta20\""
        );
    }

    #[tokio::test]
    async fn test_backend_failure_is_generation_error() {
        let llm = Arc::new(ScriptedLlmClient::new(vec![Err(LlmError::Timeout)]));
        let err = PlanGenerator::new(llm).create_plan("x", "y").await.unwrap_err();
        assert!(matches!(err, AgentError::PlanGeneration(LlmError::Timeout)));
    }

    #[tokio::test]
    async fn test_prose_output_is_parse_error() {
        let llm = Arc::new(ScriptedLlmClient::with_replies(&["Não sei."]));
        let err = PlanGenerator::new(llm).create_plan("x", "y").await.unwrap_err();
        assert!(matches!(err, AgentError::PlanParse(_)));
    }

    #[tokio::test]
    async fn test_offline_mock_yields_single_lore_step() {
        let plan = PlanGenerator::new(Arc::new(MockLlmClient))
            .create_plan("Crie um anão", "Tormenta20")
            .await
            .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps()[0].tool.as_deref(), Some("search_lore"));
        assert!(plan.steps()[0].validate().is_some());
    }
}
