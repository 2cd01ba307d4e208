//! 检索分派器
//!
//! 把计划步骤中的工具标识映射到已注册的检索能力并调用；未知标识不调用任何能力，
//! 直接返回「Ferramenta '<tool>' desconhecida.」。每次分派输出结构化审计日志（JSON）。

use std::time::Instant;

use crate::pipeline::ToolKind;
use crate::tools::ToolRegistry;

/// 未知工具的诊断文本
pub fn unknown_tool_message(tool: &str) -> String {
    format!("Ferramenta '{}' desconhecida.", tool)
}

pub struct RetrievalDispatcher {
    registry: ToolRegistry,
}

impl RetrievalDispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// 分派一次检索；总是返回文本（结果或诊断）
    pub async fn dispatch(&self, tool: &str, query: &str, domain: &str) -> String {
        let Some(retriever) = ToolKind::from_id(tool).and_then(|kind| self.registry.get(kind)) else {
            tracing::warn!(tool = %tool, query = %query, "unknown tool in plan");
            return unknown_tool_message(tool);
        };

        let start = Instant::now();
        let result = retriever.retrieve(query, domain).await;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": retriever.kind().id(),
            "query_preview": preview(query),
            "domain": domain,
            "duration_ms": start.elapsed().as_millis() as u64,
            "result_chars": result.chars().count(),
        });
        tracing::info!(audit = %audit, "tool");

        result
    }
}

fn preview(s: &str) -> String {
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s.to_string()
    }
}
