//! Inter-call throttling
//!
//! Sequential generation calls share one provider rate ceiling, so the pipeline
//! waits a fixed interval between them. Every wait in the crate goes through the
//! [`Sleeper`] trait, which lets tests observe delays without sleeping.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Source of delays for throttling and retry loops.
#[async_trait]
pub trait Sleeper: Send + Sync + 'static {
    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately and remembers every requested delay.
///
/// Used by tests and dry runs to count and inspect waits.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// All delays requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of delays requested so far.
    pub fn count(&self) -> usize {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}

/// Enforces a fixed minimum delay between sequential outbound calls.
#[derive(Clone)]
pub struct Throttler {
    interval: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for Throttler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttler")
            .field("interval", &self.interval)
            .finish()
    }
}

impl Throttler {
    pub fn new(interval: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { interval, sleeper }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait one interval.
    ///
    /// Returns `false` if `cancel` fired before the interval elapsed. A zero
    /// interval returns immediately without touching the sleeper.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        if self.interval.is_zero() {
            return true;
        }

        tracing::debug!(
            interval_ms = self.interval.as_millis() as u64,
            "throttling before next generation call"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = self.sleeper.sleep(self.interval) => true,
        }
    }
}
