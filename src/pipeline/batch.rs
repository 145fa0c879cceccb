//! Sequential multi-topic runs.
//!
//! A failed topic is marked [`BatchStatus::Failed`] and the runner moves on;
//! only cancellation stops the batch early.

use super::{PipelineError, PipelineOrchestrator, PipelineOutput};
use crate::throttle::Throttler;
use serde::Serialize;
use std::fmt;

/// Lifecycle of one batch entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchStatus::Pending => "pending",
            BatchStatus::Running => "running",
            BatchStatus::Done => "done",
            BatchStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One topic in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub topic: String,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PipelineOutput>,
}

impl BatchItem {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            status: BatchStatus::Pending,
            error: None,
            output: None,
        }
    }
}

/// Topics from a text file: one per line, blank lines and `#` comments skipped.
pub fn parse_topics(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Runs topics one after another through a single orchestrator.
pub struct BatchRunner {
    orchestrator: PipelineOrchestrator,
    /// Pause between topics
    throttler: Throttler,
}

impl BatchRunner {
    pub fn new(orchestrator: PipelineOrchestrator, throttler: Throttler) -> Self {
        Self {
            orchestrator,
            throttler,
        }
    }

    /// Run every topic in order.
    ///
    /// `on_progress` receives the topic index and the pipeline's status line.
    /// Items left unprocessed after a cancel stay `Pending`.
    pub async fn run<F>(&self, topics: Vec<String>, mut on_progress: F) -> Vec<BatchItem>
    where
        F: FnMut(usize, &str) + Send,
    {
        let mut items: Vec<BatchItem> = topics.into_iter().map(BatchItem::new).collect();
        let cancel = self.orchestrator.cancellation_token();

        for index in 0..items.len() {
            if index > 0 && !self.throttler.wait(&cancel).await {
                tracing::warn!(remaining = items.len() - index, "batch cancelled");
                break;
            }

            items[index].status = BatchStatus::Running;
            let topic = items[index].topic.clone();
            tracing::info!(index, topic = %topic, "batch item started");

            let result = self
                .orchestrator
                .generate_full_post(&topic, |status| on_progress(index, status))
                .await;

            let item = &mut items[index];
            match result {
                Ok(output) => {
                    item.status = BatchStatus::Done;
                    item.output = Some(output);
                }
                Err(PipelineError::Cancelled) => {
                    item.status = BatchStatus::Failed;
                    item.error = Some(PipelineError::Cancelled.to_string());
                    break;
                }
                Err(error) => {
                    tracing::error!(index, topic = %topic, error = %error, "batch item failed");
                    item.status = BatchStatus::Failed;
                    item.error = Some(error.to_string());
                }
            }
        }

        items
    }
}
