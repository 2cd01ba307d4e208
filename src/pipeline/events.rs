//! 执行过程事件：供入口程序把计划与逐步进度打印到标准输出

use serde::Serialize;

use crate::pipeline::plan::{Plan, Step};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// 正在调用后端生成计划
    Planning,
    /// 计划已生成
    PlanReady { plan: Plan },
    /// 开始执行第 index 步（从 0 开始）
    StepStarted {
        index: usize,
        tool: String,
        query: String,
    },
    /// 步骤缺少 tool 或 query，已跳过
    StepSkipped { index: usize, step: Step },
    /// 步骤完成，result_chars 为结果字符数
    StepFinished { index: usize, result_chars: usize },
    /// 正在综合最终回答
    Synthesizing,
}
