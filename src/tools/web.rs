//! WebSearch：Google Custom Search JSON API
//!
//! 凭据缺失、无结果、请求失败都返回诊断文本（失败原因写入文本），从不返回错误。
//! 结果格式：「Fonte: <link>\nResumo: <snippet>」，多条之间空一行。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::pipeline::ToolKind;
use crate::tools::RetrievalTool;

pub const GOOGLE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_NUM_RESULTS: usize = 3;

pub const MISSING_CREDENTIALS: &str =
    "Erro: GOOGLE_API_KEY ou SEARCH_ENGINE_ID não encontrados no ambiente.";
pub const NO_RESULTS: &str = "Nenhum resultado encontrado na web para esta busca.";

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// 把结果格式化为上下文文本；无结果时返回 NO_RESULTS
pub fn format_results(items: &[SearchItem]) -> String {
    if items.is_empty() {
        return NO_RESULTS.to_string();
    }
    items
        .iter()
        .map(|item| format!("Fonte: {}\nResumo: {}", item.link, item.snippet.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct WebSearchTool {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    engine_id: Option<String>,
    num_results: usize,
}

impl WebSearchTool {
    pub fn new(api_key: Option<String>, engine_id: Option<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: GOOGLE_SEARCH_ENDPOINT.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            engine_id: engine_id.filter(|k| !k.trim().is_empty()),
            num_results: DEFAULT_NUM_RESULTS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Custom Search 单次最多返回 10 条
    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results.clamp(1, 10);
        self
    }

    async fn search(&self, query: &str, api_key: &str, engine_id: &str) -> Result<String, String> {
        let num = self.num_results.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("key", api_key), ("cx", engine_id), ("q", query), ("num", num.as_str())])
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| format!("Invalid response: {}", e))?;

        let items: Vec<SearchItem> = body.items.into_iter().take(self.num_results).collect();
        Ok(format_results(&items))
    }
}

#[async_trait]
impl RetrievalTool for WebSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WebSearch
    }

    fn description(&self) -> &str {
        "Busca informações do mundo real (contexto histórico, científico, cultural) na web."
    }

    async fn retrieve(&self, query: &str, _domain: &str) -> String {
        let (Some(api_key), Some(engine_id)) = (self.api_key.as_deref(), self.engine_id.as_deref())
        else {
            tracing::warn!("web search credentials missing");
            return MISSING_CREDENTIALS.to_string();
        };

        tracing::info!(query = %query, "web search");
        match self.search(query, api_key, engine_id).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "web search failed");
                format!("Ocorreu um erro ao buscar na web: {}", e)
            }
        }
    }
}
