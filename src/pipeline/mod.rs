//! 规划 / 执行 / 综合 流水线

pub mod context;
pub mod events;
pub mod loop_;
pub mod plan;
pub mod planner;
pub mod prompts;
pub mod synthesizer;

pub use context::Context;
pub use events::PipelineEvent;
pub use loop_::{log_token_usage, Controller};
pub use plan::{clean_plan_text, parse_plan, Plan, Step, ToolKind, ValidStep};
pub use planner::PlanGenerator;
pub use synthesizer::{format_context, AnswerSynthesizer};
