//! Provider endpoint configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Credentialed primary provider (Google Generative Language API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "POSTFORGE_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl PrimaryConfig {
    /// Resolve the API key. Unset or blank means no credential is configured.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Upper bound on keyless attempts per logical request.
pub const MAX_KEYLESS_ATTEMPTS: u32 = 3;

/// No-credential text generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeylessConfig {
    pub base_url: String,
    /// Model hint passed as the `model` query parameter
    pub model: String,
    /// Total attempts per logical request, first one included (1..=3)
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
    /// Bodies shorter than this that mention an error are soft failures
    pub min_content_chars: usize,
}

impl Default for KeylessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://text.pollinations.ai".to_string(),
            model: "openai".to_string(),
            max_attempts: MAX_KEYLESS_ATTEMPTS,
            retry_delay_ms: 2500,
            timeout_secs: 30,
            min_content_chars: 50,
        }
    }
}

impl KeylessConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Image URL generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub enabled: bool,
    pub base_url: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://image.pollinations.ai".to_string(),
            width: 1280,
            height: 720,
        }
    }
}
