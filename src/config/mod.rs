//! Configuration module for postforge
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`POSTFORGE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use postforge::config::PostforgeConfig;
//!
//! let config = PostforgeConfig::default();
//! assert_eq!(config.keyless.max_attempts, 3);
//!
//! let toml = r#"
//! [pipeline]
//! section_interval_secs = 5
//! "#;
//! let config: PostforgeConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.pipeline.section_interval_secs, 5);
//! ```

pub mod error;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod routing;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use pipeline::PipelineConfig;
pub use provider::{ImageConfig, KeylessConfig, PrimaryConfig, MAX_KEYLESS_ATTEMPTS};
pub use routing::{ProviderCandidate, RoutingConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for a generation session.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PostforgeConfig {
    /// Credentialed primary provider
    pub primary: PrimaryConfig,
    /// No-credential fallback provider
    pub keyless: KeylessConfig,
    /// Image URL generation
    pub images: ImageConfig,
    /// Candidate models and same-candidate retries
    pub routing: RoutingConfig,
    /// Stage timing and document shape
    pub pipeline: PipelineConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl PostforgeConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.to_path_buf(),
                    source,
                })?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: p.to_path_buf(),
                    message: e.to_string(),
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports POSTFORGE_* environment variables for common settings.
    /// Invalid values are silently ignored (current values are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("POSTFORGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("POSTFORGE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(models) = std::env::var("POSTFORGE_MODELS") {
            let candidates = RoutingConfig::candidates_from_list(&models);
            if !candidates.is_empty() {
                self.routing.candidates = candidates;
            }
        }
        if let Ok(url) = std::env::var("POSTFORGE_KEYLESS_URL") {
            self.keyless.base_url = url;
        }

        if let Ok(interval) = std::env::var("POSTFORGE_SECTION_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.pipeline.section_interval_secs = secs;
            }
        }
        if let Ok(images) = std::env::var("POSTFORGE_IMAGES") {
            self.images.enabled = images.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keyless.base_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "keyless.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        if !(1..=MAX_KEYLESS_ATTEMPTS).contains(&self.keyless.max_attempts) {
            return Err(ConfigError::Validation {
                field: "keyless.max_attempts".to_string(),
                message: format!("must be between 1 and {}", MAX_KEYLESS_ATTEMPTS),
            });
        }
        if self.keyless.timeout_secs == 0 || self.primary.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs".to_string(),
                message: "timeouts must be non-zero".to_string(),
            });
        }
        if self.primary.base_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "primary.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        if self.images.enabled && self.images.base_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "images.base_url".to_string(),
                message: "URL cannot be empty while images are enabled".to_string(),
            });
        }

        routing::validate_candidates(&self.routing.candidates)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_postforge_config_defaults() {
        let config = PostforgeConfig::default();
        assert_eq!(config.keyless.max_attempts, 3);
        assert_eq!(config.pipeline.section_interval_secs, 15);
        assert_eq!(config.routing.candidates.len(), 3);
        assert!(config.images.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_minimal_toml() {
        let toml = r#"
        [keyless]
        retry_delay_ms = 100
        "#;

        let config: PostforgeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.keyless.retry_delay_ms, 100);
        assert_eq!(config.keyless.max_attempts, 3); // Default
    }

    #[test]
    fn test_config_parse_example_toml() {
        let toml = include_str!("../../postforge.example.toml");
        let config: PostforgeConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.routing.candidates.is_empty());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[pipeline]\nimage_every = 4").unwrap();

        let config = PostforgeConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.pipeline.image_every, 4);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[pipeline\nimage_every = ").unwrap();

        let result = PostforgeConfig::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = PostforgeConfig::load(Some(Path::new("/nonexistent/postforge.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_load_none_returns_defaults() {
        let config = PostforgeConfig::load(None).unwrap();
        assert_eq!(config.keyless.model, "openai");
    }

    #[test]
    fn test_config_env_override_models() {
        std::env::set_var("POSTFORGE_MODELS", "model-x, model-y");
        let config = PostforgeConfig::default().with_env_overrides();
        std::env::remove_var("POSTFORGE_MODELS");

        assert_eq!(
            config.routing.candidates,
            vec![
                ProviderCandidate::new("model-x", 1),
                ProviderCandidate::new("model-y", 2)
            ]
        );
    }

    #[test]
    fn test_config_env_override_keyless_url() {
        std::env::set_var("POSTFORGE_KEYLESS_URL", "http://127.0.0.1:9999");
        let config = PostforgeConfig::default().with_env_overrides();
        std::env::remove_var("POSTFORGE_KEYLESS_URL");

        assert_eq!(config.keyless.base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_config_env_override_images() {
        std::env::set_var("POSTFORGE_IMAGES", "false");
        let config = PostforgeConfig::default().with_env_overrides();
        std::env::remove_var("POSTFORGE_IMAGES");

        assert!(!config.images.enabled);
    }

    #[test]
    fn test_config_env_invalid_interval_ignored() {
        std::env::set_var("POSTFORGE_SECTION_INTERVAL", "soon");
        let config = PostforgeConfig::default().with_env_overrides();
        std::env::remove_var("POSTFORGE_SECTION_INTERVAL");

        // Should keep default, not crash
        assert_eq!(config.pipeline.section_interval_secs, 15);
    }

    #[test]
    fn test_config_validation_too_many_attempts() {
        let mut config = PostforgeConfig::default();
        config.keyless.max_attempts = 10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "keyless.max_attempts"
        ));

        config.keyless.max_attempts = MAX_KEYLESS_ATTEMPTS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_attempts() {
        let mut config = PostforgeConfig::default();
        config.keyless.max_attempts = 0;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "keyless.max_attempts"
        ));
    }

    #[test]
    fn test_config_validation_empty_keyless_url() {
        let mut config = PostforgeConfig::default();
        config.keyless.base_url = String::new();

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field.contains("keyless")
        ));
    }

    #[test]
    fn test_config_validation_images_disabled_allows_empty_url() {
        let mut config = PostforgeConfig::default();
        config.images.enabled = false;
        config.images.base_url = String::new();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_duplicate_candidate() {
        let mut config = PostforgeConfig::default();
        config
            .routing
            .candidates
            .push(ProviderCandidate::new("gemini-2.0-flash", 9));

        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateCandidate(_))
        ));
    }
}
