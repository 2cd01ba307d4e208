//! 编排层错误类型
//!
//! 规划阶段（PlanGeneration / PlanParse / PlanSchema）的错误在 Controller 边界转为面向用户的文本；
//! Synthesis 向上传播到入口程序；Config 在启动时致命。单步问题不会成为错误。

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum AgentError {
    /// 启动时缺少必需凭据或配置非法
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 规划时后端调用失败
    #[error("Plan generation failed: {0}")]
    PlanGeneration(#[source] LlmError),

    /// 计划文本不是合法 JSON
    #[error("Plan is not valid JSON: {0}")]
    PlanParse(String),

    /// 计划是合法 JSON，但不是预期的步骤对象数组
    #[error("Plan does not match the step schema: {0}")]
    PlanSchema(String),

    /// 综合回答时后端调用失败
    #[error("Answer synthesis failed: {0}")]
    Synthesis(#[source] LlmError),
}

impl AgentError {
    /// 是否属于规划阶段（在 Controller 内被转为文本）
    pub fn is_planning(&self) -> bool {
        matches!(
            self,
            AgentError::PlanGeneration(_) | AgentError::PlanParse(_) | AgentError::PlanSchema(_)
        )
    }
}
