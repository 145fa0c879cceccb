//! Multi-stage post generation
//!
//! [`PipelineOrchestrator`] turns a topic into a [`GeneratedPost`]:
//! outline, hero image, one call per section (throttled), FAQ, summary, then
//! assembly. Every stage is strictly sequential. Only an empty topic, a
//! terminal outline failure, or cancellation abort the run; every other
//! failure is collected as a [`StageFailure`] next to the post.

pub mod batch;
pub mod error;
pub mod outline;
pub mod prompts;

pub use batch::{parse_topics, BatchItem, BatchRunner, BatchStatus};
pub use error::{PipelineError, Stage, StageFailure};

use crate::config::PipelineConfig;
use crate::document::{self, html::plain_excerpt, GeneratedPost, PostMetadata, Section};
use crate::logging::{generate_run_id, truncate_prompt};
use crate::provider::{
    GenerationFailed, GenerationRequest, ImageGenerator, ProviderError, TextGenerator,
};
use crate::throttle::Throttler;
use chrono::Utc;
use outline::{default_outline, parse_outline, strip_code_fences};
use prompts::SYSTEM_CONTEXT;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Upper bound on excerpt length, in characters.
pub const EXCERPT_MAX_CHARS: usize = 150;

/// Summaries shorter than this are treated as malformed and re-requested.
const EXCERPT_MIN_CHARS: usize = 40;

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub post: GeneratedPost,
    /// Stages that failed without aborting the run, in the order they happened
    pub failures: Vec<StageFailure>,
}

impl PipelineOutput {
    /// True when no stage failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives one topic through every generation stage.
pub struct PipelineOrchestrator {
    generator: Arc<dyn TextGenerator>,
    images: Option<Arc<dyn ImageGenerator>>,
    throttler: Throttler,
    config: PipelineConfig,
    cancel: CancellationToken,
    log_content: bool,
}

impl PipelineOrchestrator {
    /// `images = None` disables both the hero and the inline images.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        images: Option<Arc<dyn ImageGenerator>>,
        throttler: Throttler,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            images,
            throttler,
            config,
            cancel: CancellationToken::new(),
            log_content: false,
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Log (truncated) prompt text at debug level.
    pub fn with_content_logging(mut self, enabled: bool) -> Self {
        self.log_content = enabled;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate a complete post for `topic`.
    ///
    /// `on_progress` receives one human-readable status line per stage and
    /// per section.
    pub async fn generate_full_post<F>(
        &self,
        topic: &str,
        on_progress: F,
    ) -> Result<PipelineOutput, PipelineError>
    where
        F: FnMut(&str) + Send,
    {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PipelineError::EmptyTopic);
        }
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let span = tracing::info_span!("post", run_id = %generate_run_id());
        self.run(topic, on_progress).instrument(span).await
    }

    async fn run<F>(&self, topic: &str, mut on_progress: F) -> Result<PipelineOutput, PipelineError>
    where
        F: FnMut(&str) + Send,
    {
        let started = Instant::now();
        let mut failures = Vec::new();
        tracing::info!(topic, generator = self.generator.name(), "starting post generation");

        on_progress("Generating outline");
        let outline = self.generate_outline(topic, &mut failures).await?;
        on_progress(&format!("Outline ready: {} sections", outline.len()));

        let hero_image_url = match &self.images {
            Some(images) => {
                on_progress("Generating hero image");
                match self
                    .generate_image(images.as_ref(), &prompts::hero_image_prompt(topic))
                    .await?
                {
                    Ok(url) => Some(url),
                    Err(error) => {
                        self.record(&mut failures, Stage::HeroImage, error.to_string());
                        None
                    }
                }
            }
            None => None,
        };

        let mut sections = Vec::with_capacity(outline.len());
        for (index, title) in outline.iter().enumerate() {
            if index > 0 && !self.throttler.wait(&self.cancel).await {
                return Err(PipelineError::Cancelled);
            }
            on_progress(&format!(
                "Writing section {}/{}: {}",
                index + 1,
                outline.len(),
                title
            ));

            let section = self
                .generate_section(topic, title, index, outline.len(), &mut failures)
                .await?;
            if section.content_html.is_empty() {
                on_progress(&format!("Section {} failed, continuing", index + 1));
            }
            sections.push(section);
        }

        on_progress("Generating FAQ");
        let faq_html = match self.generate_text(prompts::faq_prompt(topic)).await? {
            Ok(text) => {
                let faq = strip_code_fences(&text);
                if faq.is_empty() {
                    self.record(&mut failures, Stage::Faq, "empty FAQ response");
                    None
                } else {
                    Some(faq.to_string())
                }
            }
            Err(error) => {
                self.record(&mut failures, Stage::Faq, error.to_string());
                None
            }
        };

        on_progress("Writing summary");
        let excerpt = self
            .generate_excerpt(topic, &sections, &mut failures)
            .await?;

        on_progress("Assembling document");
        let metadata = PostMetadata {
            excerpt,
            faq_html,
            hero_image_url,
            generated_at: Utc::now(),
        };
        let post = document::assemble(topic, &sections, &metadata);

        tracing::info!(
            topic,
            slug = %post.slug,
            sections = sections.len(),
            failures = failures.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "post generation finished"
        );
        on_progress("Done");

        Ok(PipelineOutput { post, failures })
    }

    async fn generate_outline(
        &self,
        topic: &str,
        failures: &mut Vec<StageFailure>,
    ) -> Result<Vec<String>, PipelineError> {
        let attempts = self.config.outline_retries + 1;
        for attempt in 1..=attempts {
            let response = self
                .generate_text(prompts::outline_prompt(topic))
                .await?
                .map_err(PipelineError::Outline)?;

            if let Some(titles) = parse_outline(&response) {
                tracing::debug!(attempt, sections = titles.len(), "outline parsed");
                return Ok(titles);
            }
            tracing::warn!(attempt, attempts, "outline response was not a JSON array");
        }

        self.record(
            failures,
            Stage::Outline,
            "no parseable outline returned, using the default outline",
        );
        Ok(default_outline(topic))
    }

    async fn generate_section(
        &self,
        topic: &str,
        title: &str,
        index: usize,
        total: usize,
        failures: &mut Vec<StageFailure>,
    ) -> Result<Section, PipelineError> {
        let started = Instant::now();
        let links = prompts::sample_tool_links(self.config.internal_link_sample);
        let prompt = prompts::section_prompt(topic, title, index, total, &links);

        let mut section = match self.generate_text(prompt).await? {
            Ok(body) => {
                metrics::counter!("postforge_sections_total", "status" => "ok").increment(1);
                tracing::info!(
                    section = index,
                    title,
                    latency_ms = started.elapsed().as_millis() as u64,
                    "section generated"
                );
                Section::new(title, strip_code_fences(&body))
            }
            Err(error) => {
                metrics::counter!("postforge_sections_total", "status" => "failed").increment(1);
                self.record(failures, Stage::Section(index), error.to_string());
                Section::new(title, "")
            }
        };

        if self.config.wants_image(index) {
            if let Some(images) = &self.images {
                let prompt = prompts::section_image_prompt(topic, title);
                match self.generate_image(images.as_ref(), &prompt).await? {
                    Ok(url) => section = section.with_image(url, title),
                    Err(error) => {
                        self.record(failures, Stage::SectionImage(index), error.to_string())
                    }
                }
            }
        }

        Ok(section)
    }

    /// Summary text for `excerpt` and `meta_description`.
    ///
    /// Too-short answers are re-requested; a terminal failure falls back to
    /// the introduction's text.
    async fn generate_excerpt(
        &self,
        topic: &str,
        sections: &[Section],
        failures: &mut Vec<StageFailure>,
    ) -> Result<String, PipelineError> {
        let attempts = self.config.metadata_retries + 1;
        let mut problem = String::new();

        for attempt in 1..=attempts {
            match self.generate_text(prompts::excerpt_prompt(topic)).await? {
                Ok(text) => {
                    let summary = clean_summary(&text);
                    let chars = summary.chars().count();
                    if chars >= EXCERPT_MIN_CHARS {
                        return Ok(summary);
                    }
                    tracing::warn!(attempt, attempts, chars, "summary too short");
                    problem = format!("summary too short ({} chars)", chars);
                }
                Err(error) => {
                    problem = error.to_string();
                    break;
                }
            }
        }

        self.record(failures, Stage::Metadata, problem);

        let from_intro = sections
            .first()
            .map(|intro| plain_excerpt(&intro.content_html, EXCERPT_MAX_CHARS))
            .unwrap_or_default();
        if from_intro.is_empty() {
            Ok(format!("A practical guide to {}.", topic))
        } else {
            Ok(from_intro)
        }
    }

    /// One text call, aborted if the run is cancelled.
    async fn generate_text(
        &self,
        prompt: String,
    ) -> Result<Result<String, GenerationFailed>, PipelineError> {
        tracing::debug!(
            prompt = truncate_prompt(&prompt, self.log_content).as_deref(),
            "text generation request"
        );
        let request = GenerationRequest::new(prompt, SYSTEM_CONTEXT);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PipelineError::Cancelled),
            result = self.generator.generate(&request) => Ok(result),
        }
    }

    async fn generate_image(
        &self,
        images: &dyn ImageGenerator,
        prompt: &str,
    ) -> Result<Result<String, ProviderError>, PipelineError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PipelineError::Cancelled),
            result = images.generate(prompt) => Ok(result),
        }
    }

    fn record(&self, failures: &mut Vec<StageFailure>, stage: Stage, message: impl Into<String>) {
        let failure = StageFailure::new(stage, message);
        tracing::warn!(stage = %failure.stage, error = %failure.message, "pipeline stage failed");
        failures.push(failure);
    }
}

/// Normalize a model summary: no fences, no markup, no wrapping quotes.
fn clean_summary(text: &str) -> String {
    let plain = plain_excerpt(strip_code_fences(text), usize::MAX);
    let unquoted = plain.trim_matches(|c: char| c == '"' || c == '\'').trim();
    unquoted.chars().take(EXCERPT_MAX_CHARS).collect::<String>().trim_end().to_string()
}
