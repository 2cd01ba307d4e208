//! Grimoire - RPG 创作助手的规划 / 执行 / 综合流水线
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）与凭据
//! - **core**: 错误类型、组件装配（共享限速后端 → Planner / Synthesizer）
//! - **llm**: 消息、LLM 客户端抽象、重试、限速、后端实现（Gemini / OpenAI 兼容 / Mock）、嵌入
//! - **pipeline**: Plan 解析、PlanGenerator、Context、AnswerSynthesizer、执行循环 Controller
//! - **rag**: lore 索引（分块、持久化相似度索引、文档入库）
//! - **tools**: 检索能力（LoreSearch / WebSearch）、注册表与分派器
//! - **observability**: 日志初始化

pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod pipeline;
pub mod rag;
pub mod tools;

pub use crate::core::AgentError;
pub use crate::pipeline::{Controller, Plan, Step, ToolKind};
