//! 检索工具注册表
//!
//! 所有检索能力实现 RetrievalTool（kind / description / retrieve），由 ToolRegistry 按 ToolKind 注册与查找。
//! retrieve 不返回错误：内部失败一律折叠为诊断文本。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::pipeline::ToolKind;

#[async_trait]
pub trait RetrievalTool: Send + Sync {
    /// 对应的工具类型
    fn kind(&self) -> ToolKind;

    /// 工具描述
    fn description(&self) -> &str;

    /// 执行检索；domain 只对领域内检索有意义
    async fn retrieve(&self, query: &str, domain: &str) -> String;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Arc<dyn RetrievalTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl RetrievalTool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    /// 注册共享实例（同一类型重复注册时后者覆盖）
    pub fn register_arc(&mut self, tool: Arc<dyn RetrievalTool>) {
        self.tools.insert(tool.kind(), tool);
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn RetrievalTool>> {
        self.tools.get(&kind).cloned()
    }

    /// 已注册的工具类型（按 ToolKind::ALL 顺序）
    pub fn kinds(&self) -> Vec<ToolKind> {
        ToolKind::ALL
            .into_iter()
            .filter(|k| self.tools.contains_key(k))
            .collect()
    }

    /// 返回 (id, description) 列表
    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        self.kinds()
            .into_iter()
            .filter_map(|k| self.tools.get(&k).map(|t| (k.id().to_string(), t.description().to_string())))
            .collect()
    }
}
