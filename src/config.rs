//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `GRIMOIRE__*` 覆盖（双下划线表示嵌套，如 `GRIMOIRE__LLM__PROVIDER=mock`）。
//! 凭据不进配置文件，只从环境变量读取（见 Credentials）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::llm::{GEMINI_EMBEDDING, GEMINI_PRO};
use crate::tools::web::{DEFAULT_NUM_RESULTS, GOOGLE_SEARCH_ENDPOINT};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub embedding: EmbeddingSection,
    pub tools: ToolsSection,
}

/// [llm] 段：后端、重试、限速与温度
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// gemini / openai / mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// 瞬时失败的额外重试次数
    pub max_retries: usize,
    /// 相邻两次后端调用的最小间隔（秒）
    pub min_interval_secs: f64,
    pub plan_temperature: f32,
    pub synthesis_temperature: f32,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: GEMINI_PRO.to_string(),
            base_url: None,
            max_retries: 2,
            // 3 秒 = 每分钟 20 次，免费额度内安全
            min_interval_secs: 3.0,
            plan_temperature: 0.0,
            synthesis_temperature: 0.7,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// [embedding] 段：lore 索引使用的嵌入模型
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSection {
    pub model: String,
    pub base_url: Option<String>,
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            model: GEMINI_EMBEDDING.to_string(),
            base_url: None,
        }
    }
}

/// [tools] 段
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub lore: LoreSection,
    pub web: WebSection,
}

/// [tools.lore] 段：索引根目录与返回段落数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoreSection {
    pub index_root: PathBuf,
    pub top_k: usize,
}

impl Default for LoreSection {
    fn default() -> Self {
        Self {
            index_root: PathBuf::from("vector_stores"),
            top_k: 5,
        }
    }
}

/// [tools.web] 段：搜索端点、结果数、超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSection {
    pub endpoint: String,
    pub num_results: usize,
    pub timeout_secs: u64,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            endpoint: GOOGLE_SEARCH_ENDPOINT.to_string(),
            num_results: DEFAULT_NUM_RESULTS,
            timeout_secs: 15,
        }
    }
}

/// 环境变量中的凭据
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub google_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            google_api_key: var("GOOGLE_API_KEY"),
            search_engine_id: var("SEARCH_ENGINE_ID"),
            openai_api_key: var("OPENAI_API_KEY"),
        }
    }
}

/// 从 config 目录加载配置，环境变量 GRIMOIRE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 GRIMOIRE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("GRIMOIRE")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

/// 加载失败时记录警告并退回默认配置
pub fn load_config_or_default(config_path: Option<PathBuf>) -> AppConfig {
    load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    })
}
