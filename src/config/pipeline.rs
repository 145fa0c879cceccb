//! Pipeline timing and shape configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Delay between consecutive section generation calls
    pub section_interval_secs: u64,
    /// Delay between topics in a batch run
    pub topic_interval_secs: u64,
    /// Every Nth section (N > 0) gets an inline image; 0 disables them
    pub image_every: usize,
    /// Tool links offered to each section prompt
    pub internal_link_sample: usize,
    /// Extra outline calls when the response is not a JSON array
    pub outline_retries: u32,
    /// Extra summary calls when the response is unusably short
    pub metadata_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            section_interval_secs: 15,
            topic_interval_secs: 15,
            image_every: 3,
            internal_link_sample: 3,
            outline_retries: 1,
            metadata_retries: 1,
        }
    }
}

impl PipelineConfig {
    pub fn section_interval(&self) -> Duration {
        Duration::from_secs(self.section_interval_secs)
    }

    pub fn topic_interval(&self) -> Duration {
        Duration::from_secs(self.topic_interval_secs)
    }

    /// Whether section `index` carries an inline image.
    pub fn wants_image(&self, index: usize) -> bool {
        self.image_every > 0 && index > 0 && index % self.image_every == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.section_interval(), Duration::from_secs(15));
        assert_eq!(config.image_every, 3);
    }

    #[test]
    fn test_image_cadence() {
        let config = PipelineConfig::default();
        let with_images: Vec<usize> = (0..8).filter(|i| config.wants_image(*i)).collect();
        assert_eq!(with_images, vec![3, 6]);
    }

    #[test]
    fn test_image_cadence_disabled() {
        let config = PipelineConfig {
            image_every: 0,
            ..PipelineConfig::default()
        };
        assert!((0..10).all(|i| !config.wants_image(i)));
    }
}
