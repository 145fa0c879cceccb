//! Text and image generation providers.
//!
//! This module provides the traits the router and pipeline depend on, plus the
//! concrete HTTP clients behind them:
//!
//! - [`primary::GeminiProvider`] - credentialed, model-selectable text generation
//! - [`keyless::KeylessClient`] - no-credential text generation with its own retry loop
//! - [`image::ImageClient`] - prompt to embeddable image URL

use async_trait::async_trait;

pub mod error;
pub mod image;
pub mod keyless;
pub mod primary;
pub mod types;

pub use error::{ErrorKind, GenerationFailed, ProviderError};
pub use image::ImageClient;
pub use keyless::KeylessClient;
pub use primary::GeminiProvider;
pub use types::{GenerationAttempt, GenerationRequest};

/// Credentialed provider that serves several models.
///
/// One call is one HTTP request; retries and candidate rotation belong to the
/// router.
#[async_trait]
pub trait ModelProvider: Send + Sync + 'static {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// Issue one generation call against `model`.
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError>;
}

/// Anything that turns a request into text, retries included.
///
/// Implemented by the keyless client and by the router itself, so the pipeline
/// does not care which path produced the text.
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailed>;
}

/// Turns a text prompt into a directly embeddable image URL.
#[async_trait]
pub trait ImageGenerator: Send + Sync + 'static {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Random decorrelation token so identical prompts are not served cached output.
pub(crate) fn random_seed() -> u32 {
    rand::random::<u32>() % 1_000_000
}
