//! Gemini 客户端（走 Google 提供的 OpenAI 兼容端点）
//!
//! - Base URL: https://generativelanguage.googleapis.com/v1beta/openai/
//! - 凭据: GOOGLE_API_KEY

use crate::llm::OpenAiClient;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const GEMINI_PRO: &str = "gemini-2.5-pro";
pub const GEMINI_EMBEDDING: &str = "text-embedding-004";

/// 创建 Gemini 客户端；model 为 None 时使用 gemini-2.5-pro
pub fn create_gemini_client(model: Option<&str>, api_key: &str) -> OpenAiClient {
    OpenAiClient::new(Some(GEMINI_BASE_URL), model.unwrap_or(GEMINI_PRO), api_key)
}
