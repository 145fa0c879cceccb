//! Shared test utilities for postforge integration tests.
//!
//! Scripted generators that answer by pipeline stage, so tests describe
//! behavior per stage instead of per call order.

#![allow(dead_code)]

use async_trait::async_trait;
use postforge::config::PipelineConfig;
use postforge::pipeline::PipelineOrchestrator;
use postforge::provider::{
    GenerationFailed, GenerationRequest, ImageGenerator, ProviderError, TextGenerator,
};
use postforge::throttle::{RecordingSleeper, Throttler};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Well-Known Test Constants
// =============================================================================

/// Long enough to pass every length check in the pipeline.
pub const SECTION_BODY: &str = "<p>Steeping green tea at 80 degrees keeps the leaves from turning bitter and \
preserves most of the delicate aroma. Try the <a href=\"/tools/unit-converter\">Unit Converter</a> \
if your kettle only shows Fahrenheit.</p>";

pub const SUMMARY: &str =
    "A practical introduction to brewing green tea, with temperatures, timings and common mistakes.";

pub const FAQ: &str = "<h3>Is green tea caffeinated?</h3><p>Yes, lightly.</p>";

// =============================================================================
// Stage Detection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStage {
    Outline,
    Section,
    Faq,
    Summary,
    Other,
}

/// Which pipeline stage produced `prompt`.
pub fn stage_of(prompt: &str) -> PromptStage {
    if prompt.starts_with("Create an outline") {
        PromptStage::Outline
    } else if prompt.starts_with("Write the section") {
        PromptStage::Section
    } else if prompt.contains("frequently asked questions") {
        PromptStage::Faq
    } else if prompt.contains("plain-text summary") {
        PromptStage::Summary
    } else {
        PromptStage::Other
    }
}

pub fn failed(status: u16) -> GenerationFailed {
    GenerationFailed::new(
        "keyless",
        ProviderError::Upstream {
            status,
            message: format!("status {}", status),
        },
    )
}

pub fn json_outline(titles: &[&str]) -> String {
    serde_json::to_string(titles).unwrap()
}

// =============================================================================
// Scripted Text Generator
// =============================================================================

type Handler = dyn Fn(&str) -> Result<String, GenerationFailed> + Send + Sync;

/// Text generator driven by a prompt handler; records every prompt it sees.
pub struct ScriptedGenerator {
    handler: Box<Handler>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(
        handler: impl Fn(&str) -> Result<String, GenerationFailed> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers every stage successfully, using `outline` for the outline call.
    pub fn happy(outline: String) -> Self {
        Self::new(move |prompt| Ok(default_answer(prompt, &outline)))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn count(&self, stage: PromptStage) -> usize {
        self.prompts()
            .iter()
            .filter(|p| stage_of(p) == stage)
            .count()
    }
}

/// Successful answer for any stage.
pub fn default_answer(prompt: &str, outline: &str) -> String {
    match stage_of(prompt) {
        PromptStage::Outline => outline.to_string(),
        PromptStage::Faq => FAQ.to_string(),
        PromptStage::Summary => SUMMARY.to_string(),
        PromptStage::Section | PromptStage::Other => SECTION_BODY.to_string(),
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailed> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        (self.handler)(&request.prompt)
    }
}

// =============================================================================
// Scripted Image Generator
// =============================================================================

#[derive(Default)]
pub struct ScriptedImages {
    prompts: Mutex<Vec<String>>,
    pub fail: bool,
}

impl ScriptedImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageGenerator for ScriptedImages {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.to_string());
        if self.fail {
            return Err(ProviderError::Network("image host unreachable".to_string()));
        }
        Ok(format!("https://img.test/{}.png", prompts.len()))
    }
}

// =============================================================================
// Orchestrator Builders
// =============================================================================

pub struct Fixture {
    pub generator: Arc<ScriptedGenerator>,
    pub images: Arc<ScriptedImages>,
    pub sleeper: Arc<RecordingSleeper>,
    pub orchestrator: PipelineOrchestrator,
}

pub fn fixture(generator: ScriptedGenerator, images: ScriptedImages) -> Fixture {
    fixture_with_config(generator, images, PipelineConfig::default())
}

pub fn fixture_with_config(
    generator: ScriptedGenerator,
    images: ScriptedImages,
    config: PipelineConfig,
) -> Fixture {
    let generator = Arc::new(generator);
    let images = Arc::new(images);
    let sleeper = Arc::new(RecordingSleeper::new());
    let throttler = Throttler::new(config.section_interval(), sleeper.clone());
    let orchestrator = PipelineOrchestrator::new(
        generator.clone(),
        Some(images.clone()),
        throttler,
        config,
    );
    Fixture {
        generator,
        images,
        sleeper,
        orchestrator,
    }
}

pub fn seconds(n: u64) -> Duration {
    Duration::from_secs(n)
}
