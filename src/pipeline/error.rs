//! Pipeline error types.

use crate::provider::GenerationFailed;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that abort a whole `generate_full_post` run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Topic must not be empty")]
    EmptyTopic,

    #[error("Outline generation failed: {0}")]
    Outline(#[source] GenerationFailed),

    #[error("Generation cancelled")]
    Cancelled,
}

/// Pipeline stage a non-fatal failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "index")]
pub enum Stage {
    Outline,
    HeroImage,
    Section(usize),
    SectionImage(usize),
    Faq,
    Metadata,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Outline => write!(f, "outline"),
            Stage::HeroImage => write!(f, "hero image"),
            Stage::Section(i) => write!(f, "section {}", i),
            Stage::SectionImage(i) => write!(f, "section {} image", i),
            Stage::Faq => write!(f, "faq"),
            Stage::Metadata => write!(f, "metadata"),
        }
    }
}

/// A stage that failed without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Section(3).to_string(), "section 3");
        assert_eq!(Stage::SectionImage(6).to_string(), "section 6 image");
    }

    #[test]
    fn test_outline_error_message() {
        let err = PipelineError::Outline(GenerationFailed::new(
            "keyless",
            ProviderError::Network("reset".to_string()),
        ));
        assert!(err.to_string().starts_with("Outline generation failed: Generation failed via keyless"));
    }

    #[test]
    fn test_stage_failure_serializes() {
        let failure = StageFailure::new(Stage::Section(2), "boom");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["stage"]["stage"], "section");
        assert_eq!(json["stage"]["index"], 2);
        assert_eq!(json["message"], "boom");
    }
}
