//! Routing configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::error::ConfigError;

/// One credentialed model choice in the primary provider's priority list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCandidate {
    pub name: String,
    /// Lower = tried first
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl ProviderCandidate {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
        }
    }
}

fn default_priority() -> i32 {
    50
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Primary provider models, probed in priority order
    pub candidates: Vec<ProviderCandidate>,
    /// Extra same-candidate attempts on transient server or network failures
    pub max_retries: u32,
    /// Delay before each same-candidate retry
    pub retry_delay_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            candidates: vec![
                ProviderCandidate::new("gemini-2.0-flash", 1),
                ProviderCandidate::new("gemini-1.5-flash", 2),
                ProviderCandidate::new("gemini-1.5-flash-8b", 3),
            ],
            max_retries: 2,
            retry_delay_ms: 2000,
        }
    }
}

impl RoutingConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Parse a comma-separated model list; priority follows list order.
    pub fn candidates_from_list(list: &str) -> Vec<ProviderCandidate> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .enumerate()
            .map(|(i, name)| ProviderCandidate::new(name, i as i32 + 1))
            .collect()
    }
}

/// Validate candidate names: non-empty and unique
pub fn validate_candidates(candidates: &[ProviderCandidate]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (i, candidate) in candidates.iter().enumerate() {
        if candidate.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: format!("routing.candidates[{}].name", i),
                message: "name cannot be empty".to_string(),
            });
        }
        if !seen.insert(candidate.name.as_str()) {
            return Err(ConfigError::DuplicateCandidate(candidate.name.clone()));
        }
    }
    Ok(())
}
