//! LLM 层：消息、客户端抽象、重试、限速与各后端实现（OpenAI 兼容 / Gemini / Mock），以及嵌入

pub mod embedding;
pub mod gemini;
pub mod message;
pub mod mock;
pub mod openai;
pub mod rate_limit;
pub mod traits;

pub use embedding::{EmbeddingProvider, HashingEmbedder, OpenAiEmbedder, SharedEmbedder};
pub use gemini::{create_gemini_client, GEMINI_BASE_URL, GEMINI_EMBEDDING, GEMINI_PRO};
pub use message::{Message, Role};
pub use mock::{MockLlmClient, RecordedCall, ScriptedLlmClient, JSON_ONLY_MARKER};
pub use openai::{OpenAiClient, TokenUsage};
pub use rate_limit::RateLimitedClient;
pub use traits::{LlmClient, LlmError, RetryConfig, RetryingLlmClient};
