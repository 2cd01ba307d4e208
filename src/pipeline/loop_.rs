//! 执行循环（Controller）
//!
//! Plan -> 逐步分派检索 -> 累积 Context -> 综合回答。严格线性：一次遍历计划，不重规划、不回溯。
//! 规划失败转为面向用户的错误文本直接返回；单步问题只记日志或变成诊断文本；综合失败向上传播。

use tokio::sync::mpsc;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::pipeline::context::Context;
use crate::pipeline::events::PipelineEvent;
use crate::pipeline::planner::PlanGenerator;
use crate::pipeline::synthesizer::AnswerSynthesizer;
use crate::tools::RetrievalDispatcher;

/// 编排器：领域在构造时固定，整个请求期间不变
pub struct Controller {
    domain: String,
    planner: PlanGenerator,
    dispatcher: RetrievalDispatcher,
    synthesizer: AnswerSynthesizer,
    event_tx: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl Controller {
    pub fn new(
        domain: impl Into<String>,
        planner: PlanGenerator,
        dispatcher: RetrievalDispatcher,
        synthesizer: AnswerSynthesizer,
    ) -> Result<Self, AgentError> {
        let domain = domain.into();
        if domain.trim().is_empty() {
            return Err(AgentError::InvalidInput("domain must be provided".to_string()));
        }
        Ok(Self {
            domain,
            planner,
            dispatcher,
            synthesizer,
            event_tx: None,
        })
    }

    /// 设置事件推送通道
    pub fn with_event_tx(mut self, tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// 处理一次请求，返回最终回答（或规划失败时的错误文本）
    pub async fn execute(&self, request: &str) -> Result<String, AgentError> {
        self.emit(PipelineEvent::Planning);
        let plan = match self.planner.create_plan(request, &self.domain).await {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!(error = %e, "plan generation failed");
                return Ok(format!("Erro ao gerar o plano: {}", e));
            }
        };
        self.emit(PipelineEvent::PlanReady { plan: plan.clone() });

        let mut context = Context::new();
        for (index, step) in plan.iter().enumerate() {
            let Some(valid) = step.validate() else {
                tracing::warn!(index, step = ?step, "invalid plan step, skipping");
                self.emit(PipelineEvent::StepSkipped {
                    index,
                    step: step.clone(),
                });
                continue;
            };

            tracing::info!(index, tool = %valid.tool, query = %valid.query, "executing step");
            self.emit(PipelineEvent::StepStarted {
                index,
                tool: valid.tool.to_string(),
                query: valid.query.to_string(),
            });

            let result = self
                .dispatcher
                .dispatch(valid.tool, valid.query, &self.domain)
                .await;
            let result_chars = result.chars().count();

            if context.insert(valid.query, result).is_some() {
                tracing::debug!(query = %valid.query, "duplicate query, earlier result overwritten");
            }
            self.emit(PipelineEvent::StepFinished { index, result_chars });
        }

        self.emit(PipelineEvent::Synthesizing);
        self.synthesizer.synthesize(request, &context).await
    }
}

/// 记录后端累计 token 用量（请求结束时调用）
pub fn log_token_usage(llm: &dyn LlmClient) {
    let (prompt, completion, total) = llm.token_usage();
    tracing::info!(
        prompt_tokens = prompt,
        completion_tokens = completion,
        total_tokens = total,
        "token usage"
    );
}
