//! 核心编排层：错误类型与组件装配

pub mod error;
pub mod orchestrator;

pub use error::AgentError;
pub use orchestrator::{
    create_backend, create_controller, create_controller_with, create_embedder,
    create_llm_from_config, create_tool_registry,
};
