//! 组件装配
//!
//! 进程启动时构造一次后端客户端（provider → 重试 → 限速），以 Arc 显式注入
//! PlanGenerator 与 AnswerSynthesizer；再装配检索工具与 Controller。

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, Credentials};
use crate::core::AgentError;
use crate::llm::{
    create_gemini_client, HashingEmbedder, LlmClient, MockLlmClient, OpenAiClient,
    OpenAiEmbedder, RateLimitedClient, RetryConfig, RetryingLlmClient, SharedEmbedder,
    GEMINI_BASE_URL,
};
use crate::pipeline::{AnswerSynthesizer, Controller, PlanGenerator};
use crate::tools::{LoreSearchTool, RetrievalDispatcher, ToolRegistry, WebSearchTool};

fn require(key: &Option<String>, name: &str, provider: &str) -> Result<String, AgentError> {
    key.clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AgentError::Config(format!("{} is required for provider '{}'", name, provider)))
}

/// 根据配置选择后端（gemini / openai / mock）；缺少凭据时返回 Config 错误
pub fn create_llm_from_config(
    cfg: &AppConfig,
    creds: &Credentials,
) -> Result<Arc<dyn LlmClient>, AgentError> {
    let provider = cfg.llm.provider.to_lowercase();
    let timeout = Duration::from_secs(cfg.llm.timeouts.request);
    match provider.as_str() {
        "gemini" => {
            let key = require(&creds.google_api_key, "GOOGLE_API_KEY", &provider)?;
            tracing::info!(model = %cfg.llm.model, "using Gemini backend");
            let client = match cfg.llm.base_url.as_deref() {
                Some(base) => OpenAiClient::new(Some(base), &cfg.llm.model, &key),
                None => create_gemini_client(Some(&cfg.llm.model), &key),
            };
            Ok(Arc::new(client.with_request_timeout(timeout)))
        }
        "openai" => {
            let key = require(&creds.openai_api_key, "OPENAI_API_KEY", &provider)?;
            tracing::info!(model = %cfg.llm.model, "using OpenAI-compatible backend");
            let client = OpenAiClient::new(cfg.llm.base_url.as_deref(), &cfg.llm.model, &key);
            Ok(Arc::new(client.with_request_timeout(timeout)))
        }
        "mock" => {
            tracing::warn!("using offline mock backend");
            Ok(Arc::new(MockLlmClient))
        }
        other => Err(AgentError::Config(format!("unknown llm provider '{}'", other))),
    }
}

/// 共享后端：provider 外包重试，再包限速
pub fn create_backend(
    cfg: &AppConfig,
    creds: &Credentials,
) -> Result<Arc<RateLimitedClient>, AgentError> {
    let provider = create_llm_from_config(cfg, creds)?;
    let retrying = RetryingLlmClient::new(
        provider,
        RetryConfig::default().with_max_retries(cfg.llm.max_retries),
    );
    let min_interval = Duration::from_secs_f64(cfg.llm.min_interval_secs.max(0.0));
    Ok(Arc::new(RateLimitedClient::new(Arc::new(retrying), min_interval)))
}

/// 嵌入提供方跟随 llm.provider
pub fn create_embedder(cfg: &AppConfig, creds: &Credentials) -> Result<SharedEmbedder, AgentError> {
    let provider = cfg.llm.provider.to_lowercase();
    let base = cfg.embedding.base_url.as_deref();
    match provider.as_str() {
        "gemini" => {
            let key = require(&creds.google_api_key, "GOOGLE_API_KEY", &provider)?;
            Ok(Arc::new(OpenAiEmbedder::new(
                Some(base.unwrap_or(GEMINI_BASE_URL)),
                &cfg.embedding.model,
                &key,
            )))
        }
        "openai" => {
            let key = require(&creds.openai_api_key, "OPENAI_API_KEY", &provider)?;
            Ok(Arc::new(OpenAiEmbedder::new(base, &cfg.embedding.model, &key)))
        }
        "mock" => Ok(Arc::new(HashingEmbedder::default())),
        other => Err(AgentError::Config(format!("unknown llm provider '{}'", other))),
    }
}

/// 注册 LoreSearch 与 WebSearch
pub fn create_tool_registry(cfg: &AppConfig, creds: &Credentials, embedder: SharedEmbedder) -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(
        LoreSearchTool::new(cfg.tools.lore.index_root.clone(), embedder)
            .with_top_k(cfg.tools.lore.top_k),
    );
    tools.register(
        WebSearchTool::new(
            creds.google_api_key.clone(),
            creds.search_engine_id.clone(),
            cfg.tools.web.timeout_secs,
        )
        .with_endpoint(cfg.tools.web.endpoint.clone())
        .with_num_results(cfg.tools.web.num_results),
    );
    tools
}

/// 用已构造的共享后端与工具注册表装配 Controller
pub fn create_controller_with(
    cfg: &AppConfig,
    backend: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    domain: &str,
) -> Result<Controller, AgentError> {
    let planner = PlanGenerator::new(backend.clone()).with_temperature(cfg.llm.plan_temperature);
    let synthesizer =
        AnswerSynthesizer::new(backend).with_temperature(cfg.llm.synthesis_temperature);
    Controller::new(domain, planner, RetrievalDispatcher::new(tools), synthesizer)
}

/// 从配置与凭据装配完整 Controller；同时返回共享后端句柄（用于统计 token）
pub fn create_controller(
    cfg: &AppConfig,
    creds: &Credentials,
    domain: &str,
) -> Result<(Controller, Arc<RateLimitedClient>), AgentError> {
    let backend = create_backend(cfg, creds)?;
    let embedder = create_embedder(cfg, creds)?;
    let tools = create_tool_registry(cfg, creds, embedder);
    let controller = create_controller_with(cfg, backend.clone(), tools, domain)?;
    Ok((controller, backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_with(provider: &str) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = provider.to_string();
        cfg
    }

    #[test]
    fn test_missing_google_key_is_config_error() {
        let err = create_backend(&cfg_with("gemini"), &Credentials::default()).err().unwrap();
        assert!(matches!(err, AgentError::Config(ref m) if m.contains("GOOGLE_API_KEY")));
    }

    #[test]
    fn test_missing_openai_key_is_config_error() {
        let err = create_embedder(&cfg_with("openai"), &Credentials::default()).err().unwrap();
        assert!(matches!(err, AgentError::Config(ref m) if m.contains("OPENAI_API_KEY")));
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        assert!(matches!(
            create_llm_from_config(&cfg_with("llama"), &Credentials::default()).err().unwrap(),
            AgentError::Config(_)
        ));
    }

    #[test]
    fn test_backend_uses_configured_interval() {
        let mut cfg = cfg_with("gemini");
        cfg.llm.min_interval_secs = 1.5;
        let creds = Credentials {
            google_api_key: Some("g-key".into()),
            ..Default::default()
        };
        let backend = create_backend(&cfg, &creds).unwrap();
        assert_eq!(backend.min_interval(), Duration::from_millis(1500));
    }

    #[test]
    fn test_mock_controller_needs_no_credentials() {
        let (controller, _) =
            create_controller(&cfg_with("mock"), &Credentials::default(), "Tormenta20").unwrap();
        assert_eq!(controller.domain(), "Tormenta20");
    }

    #[test]
    fn test_empty_domain_is_rejected() {
        let err = create_controller(&cfg_with("mock"), &Credentials::default(), "  ").err().unwrap();
        assert!(matches!(err, AgentError::InvalidInput(_)));
    }
}
