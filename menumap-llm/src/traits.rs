use crate::schema::SchemaNode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// Failure classes for LLM calls.
///
/// Only [`LlmError::RateLimit`] is ever retried; everything else is
/// terminal on first sight.
#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Rate limit retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Empty response from model")]
    Empty,

    #[error("Malformed response JSON ({reason}); response prefix: {snippet}")]
    MalformedResponse { reason: String, snippet: String },
}

pub type Result<T> = std::result::Result<T, LlmError>;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a free-form response to the given prompt with an optional
    /// system prompt.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Generate a response constrained to JSON conforming to `schema`.
    async fn generate_structured(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        schema: &SchemaNode,
    ) -> Result<LlmResponse>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
