//! Google Generative Language provider.

use super::{GenerationRequest, ModelProvider, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Credentialed primary provider.
///
/// Handles the Google Generative Language API:
/// - Generation via POST /v1beta/models/{model}:generateContent?key={key}
/// - System context mapped to the `systemInstruction` field
/// - Text extracted from the first candidate's parts
pub struct GeminiProvider {
    /// Base URL (e.g., "https://generativelanguage.googleapis.com")
    base_url: String,
    /// API key for query parameter authentication
    api_key: String,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
    /// Hard per-request timeout
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(base_url: String, api_key: String, client: Arc<Client>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout,
        }
    }

    fn translate_request(request: &GenerationRequest) -> GeminiRequest {
        let system_instruction = if request.system_context.trim().is_empty() {
            None
        } else {
            Some(GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: request.system_context.clone(),
                }],
            })
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction,
        }
    }

    /// Join the first candidate's text parts. A missing or blank candidate is a
    /// malformed response even though the status was 200.
    fn extract_text(response: GeminiResponse) -> Result<String, ProviderError> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse("response contained no candidates".to_string())
        })?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<String>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::InvalidResponse(format!(
                "empty candidate text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        tracing::debug!(provider = "gemini", model = %model, "initiating generation");

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&Self::translate_request(request))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::info!(
                provider = "gemini",
                model = %model,
                status = %status,
                latency_ms = start.elapsed().as_millis() as u64,
                "generation failed"
            );
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = Self::extract_text(gemini_response)?;

        tracing::info!(
            provider = "gemini",
            model = %model,
            latency_ms = start.elapsed().as_millis() as u64,
            output_chars = text.len(),
            "generation succeeded"
        );

        Ok(text)
    }
}

/// Google Generative Language request format
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "systemInstruction")]
    system_instruction: Option<GeminiSystemInstruction>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

/// Google Generative Language response format
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
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
    text: Option<String>,
}
