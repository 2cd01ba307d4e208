//! Plan：有序的检索步骤列表，以及对后端输出的清洗与解析
//!
//! 解析只要求「对象数组」这一结构；字段值的校验留到执行循环逐步进行。

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::AgentError;

/// 固定的检索能力集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToolKind {
    /// 领域内资料（规则、人物、地点、历史）
    LoreSearch,
    /// 现实世界资料（历史、科学、文化背景）
    WebSearch,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::LoreSearch, ToolKind::WebSearch];

    /// 计划 JSON 中使用的标识
    pub fn id(&self) -> &'static str {
        match self {
            ToolKind::LoreSearch => "search_lore",
            ToolKind::WebSearch => "search_web",
        }
    }

    /// 解析工具标识；同时接受 snake_case 标识与类型名
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim() {
            "search_lore" | "LoreSearch" => Some(ToolKind::LoreSearch),
            "search_web" | "WebSearch" => Some(ToolKind::WebSearch),
            _ => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// 计划中的单步；字段可能缺失，值保持后端给出的原样
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Step {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// 通过校验的步骤：tool 与 query 均存在且非空
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidStep<'a> {
    pub tool: &'a str,
    pub query: &'a str,
}

impl Step {
    pub fn new(tool: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            tool: Some(tool.into()),
            query: Some(query.into()),
        }
    }

    /// tool 或 query 缺失/为空时返回 None（该步骤会被跳过）
    pub fn validate(&self) -> Option<ValidStep<'_>> {
        let tool = self.tool.as_deref().filter(|t| !t.trim().is_empty())?;
        let query = self.query.as_deref().filter(|q| !q.trim().is_empty())?;
        Some(ValidStep { tool, query })
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            tool: obj.get("tool").and_then(field_text),
            query: obj.get("query").and_then(field_text),
        }
    }
}

/// 字段值不做类型检查：字符串原样保留，其他值取其 JSON 文本；
/// 空值（null、false、0、[]、{}）视为缺失
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 有序步骤列表；执行顺序即计划顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

static FENCE_RE: OnceLock<Regex> = OnceLock::new();

/// 去掉代码围栏（```json 等）与 BOM；其余字符原样保留
pub fn clean_plan_text(raw: &str) -> String {
    let re = FENCE_RE.get_or_init(|| Regex::new(r"```[A-Za-z]*\n?").expect("valid fence regex"));
    re.replace_all(raw, "")
        .chars()
        .filter(|c| *c != '\u{FEFF}')
        .collect::<String>()
        .trim()
        .to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 解析后端输出为 Plan
///
/// - 不是合法 JSON → PlanParse
/// - 合法 JSON 但不是对象数组，或某个对象既无 tool 也无 query → PlanSchema
pub fn parse_plan(raw: &str) -> Result<Plan, AgentError> {
    let cleaned = clean_plan_text(raw);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| AgentError::PlanParse(format!("{}: {}", e, cleaned)))?;

    let items = value.as_array().ok_or_else(|| {
        AgentError::PlanSchema(format!("expected an array of steps, got {}", json_kind(&value)))
    })?;

    let steps = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let obj = item.as_object().ok_or_else(|| {
                AgentError::PlanSchema(format!("step {} is {}, expected object", i, json_kind(item)))
            })?;
            if !obj.contains_key("tool") && !obj.contains_key("query") {
                return Err(AgentError::PlanSchema(format!(
                    "step {} has neither \"tool\" nor \"query\"",
                    i
                )));
            }
            Ok(Step::from_object(obj))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Plan::new(steps))
}
