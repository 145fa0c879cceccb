//! Image URL generation.

use super::{random_seed, ImageGenerator, ProviderError};
use crate::config::ImageConfig;
use async_trait::async_trait;
use reqwest::Url;

/// Stateless prompt-to-URL helper.
///
/// The endpoint renders the image lazily when the URL is first fetched, so the
/// URL is embedded directly without a local fetch.
#[derive(Debug, Clone)]
pub struct ImageClient {
    base_url: String,
    width: u32,
    height: u32,
}

impl ImageClient {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            width: config.width,
            height: config.height,
        }
    }

    /// Build the image URL for `prompt` with an explicit seed.
    pub fn image_url(&self, prompt: &str, seed: u32) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ProviderError::Configuration(format!(
                "invalid image base URL '{}': {}",
                self.base_url, e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::Configuration(format!(
                    "image base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push("prompt")
            .push(prompt.trim());

        url.query_pairs_mut()
            .append_pair("seed", &seed.to_string())
            .append_pair("width", &self.width.to_string())
            .append_pair("height", &self.height.to_string())
            .append_pair("nologo", "true");

        Ok(url)
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = self.image_url(prompt, random_seed())?;
        tracing::debug!(url = %url, "generated image url");
        Ok(url.to_string())
    }
}
