//! Keyless text generation client.
//!
//! Used as the last resort behind the primary candidates, and as the only path
//! when no credential is configured. Owns its retry loop: up to
//! `max_attempts` calls per logical request with a fixed delay between them.

use super::{
    random_seed, ErrorKind, GenerationAttempt, GenerationFailed, GenerationRequest, ProviderError,
    TextGenerator,
};
use crate::config::KeylessConfig;
use crate::throttle::Sleeper;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;

/// Provider name used in logs, metrics and `GenerationFailed`.
pub const KEYLESS_PROVIDER: &str = "keyless";

/// Lowercase markers that identify a provider-level error page served with 200.
const ERROR_MARKERS: &[&str] = &[
    "error",
    "rate limit",
    "too many requests",
    "unavailable",
];

/// HTTP GET text generation without a credential.
///
/// The system context and prompt are combined and URL-encoded into the path;
/// `model` and a random `seed` ride in the query string.
pub struct KeylessClient {
    config: KeylessConfig,
    client: Arc<Client>,
    sleeper: Arc<dyn Sleeper>,
}

impl KeylessClient {
    pub fn new(config: KeylessConfig, client: Arc<Client>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            config,
            client,
            sleeper,
        }
    }

    /// Build the request URL for one attempt.
    pub fn request_url(&self, prompt: &str, seed: u32) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            ProviderError::Configuration(format!(
                "invalid keyless base URL '{}': {}",
                self.config.base_url, e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::Configuration(format!(
                    "keyless base URL cannot carry a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .push(prompt);

        url.query_pairs_mut()
            .append_pair("model", &self.config.model)
            .append_pair("seed", &seed.to_string());

        Ok(url)
    }

    async fn send_once(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = self.request_url(prompt, random_seed())?;
        let timeout = self.config.timeout();

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout))?;

        if !status.is_success() {
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        validate_body(&body, self.config.min_content_chars)
    }
}

/// Failures worth another keyless attempt.
///
/// A 4xx other than 429 is a rejected request and will fail the same way again.
/// An unusable 200 body is a soft failure and is retried.
fn is_retryable(error: &ProviderError) -> bool {
    match error {
        ProviderError::Network(_) | ProviderError::Timeout(_) => true,
        ProviderError::InvalidResponse(_) => true,
        ProviderError::Upstream { .. } => matches!(
            error.kind(),
            ErrorKind::TransientServer | ErrorKind::RateLimited | ErrorKind::NetworkFailure
        ),
        ProviderError::Configuration(_) => false,
    }
}

/// Reject bodies that are empty, or short and shaped like an error message.
pub(crate) fn validate_body(body: &str, min_content_chars: usize) -> Result<String, ProviderError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::InvalidResponse(
            "empty response body".to_string(),
        ));
    }

    if trimmed.chars().count() < min_content_chars {
        let lower = trimmed.to_lowercase();
        if ERROR_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return Err(ProviderError::InvalidResponse(format!(
                "provider soft failure: {}",
                trimmed
            )));
        }
    }

    Ok(trimmed.to_string())
}

#[async_trait]
impl TextGenerator for KeylessClient {
    fn name(&self) -> &str {
        KEYLESS_PROVIDER
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailed> {
        let prompt = request.combined_prompt();
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.send_once(&prompt).await {
                Ok(text) => {
                    GenerationAttempt::succeeded(KEYLESS_PROVIDER, attempt).record();
                    return Ok(text);
                }
                Err(error) => {
                    let kind = error.kind();
                    GenerationAttempt::failed(KEYLESS_PROVIDER, attempt, kind).record();

                    if !is_retryable(&error) || attempt >= max_attempts {
                        tracing::warn!(
                            attempts = attempt,
                            error = %error,
                            "keyless generation exhausted"
                        );
                        return Err(GenerationFailed::new(KEYLESS_PROVIDER, error));
                    }

                    self.sleeper.sleep(self.config.retry_delay()).await;
                    attempt += 1;
                }
            }
        }
    }
}
