//! 检索工具：注册表、分派器，以及 LoreSearch / WebSearch 两种能力

pub mod dispatcher;
pub mod lore;
pub mod registry;
pub mod web;

pub use dispatcher::{unknown_tool_message, RetrievalDispatcher};
pub use lore::LoreSearchTool;
pub use registry::{RetrievalTool, ToolRegistry};
pub use web::WebSearchTool;
