use crate::schema::SchemaNode;
use crate::traits::{LlmClient, LlmError, LlmResponse, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    /// Set to `application/json` for schema-constrained generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<SchemaNode>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiUsageMetadata {
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}

/// Google Gemini API client.
///
/// Requires a valid API key and internet access.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client using the provided API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, GEMINI_BASE_URL)
    }

    /// Create a client against a non-default endpoint (test servers,
    /// proxies).
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    async fn send(&self, request: &GeminiRequest) -> Result<LlmResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!("Sending Gemini request to: {}", url);

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .query(&[("key", &self.api_key)])
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &error_text));
        }

        let gemini_response: GeminiResponse = resp.json().await.map_err(|e| LlmError::Api {
            status: 200,
            message: format!("failed to decode Gemini response body: {e}"),
        })?;

        let Some(candidate) = gemini_response.candidates.first() else {
            return Err(LlmError::Empty);
        };

        // A SAFETY finish reason means a candidate exists but carries no
        // usable parts.
        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(LlmError::Api {
                status: 200,
                message: "content blocked by Gemini safety filters".to_string(),
            });
        }

        let Some(part) = candidate.content.parts.first() else {
            return Err(LlmError::Empty);
        };

        let tokens_used = gemini_response
            .usage_metadata
            .and_then(|u| u.total_token_count);

        Ok(LlmResponse {
            text: part.text.clone(),
            model: Some(self.model.clone()),
            tokens_used,
        })
    }
}

/// Map an HTTP failure onto the retry/abort classification.
///
/// 429 and quota-exhaustion bodies are the only retryable class; a
/// rejected key is terminal no matter which status carried it.
fn classify_failure(status: u16, body: &str) -> LlmError {
    if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
        return LlmError::RateLimit;
    }
    if status == 401 || body.contains("API_KEY_INVALID") || body.contains("API key not valid") {
        return LlmError::InvalidApiKey;
    }
    LlmError::Api {
        status,
        message: body.to_string(),
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let generation_config = if max_tokens.is_some() || temperature.is_some() {
            Some(GeminiGenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
                response_mime_type: None,
                response_schema: None,
            })
        } else {
            None
        };

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
            system_instruction: system_prompt.map(|sys| GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: sys.to_string(),
                }],
            }),
        };

        self.send(&request).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        schema: &SchemaNode,
    ) -> Result<LlmResponse> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: None,
                max_output_tokens: None,
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema.clone()),
            }),
            system_instruction: system_prompt.map(|sys| GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: sys.to_string(),
                }],
            }),
        };

        self.send(&request).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
