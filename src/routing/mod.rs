//! Provider routing with sticky model selection and keyless fallback
//!
//! The router walks the configured primary candidates in priority order and
//! remembers the first one that succeeds. Failures are classified by
//! [`ErrorKind`]:
//!
//! - `Auth` abandons every primary candidate for the rest of the session
//! - `RateLimited` and `MalformedResponse` move straight to the next candidate
//! - `TransientServer` and `NetworkFailure` retry the same candidate first
//!
//! When no candidate is left, the keyless client gets the request.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

pub mod state;


pub use crate::config::ProviderCandidate;
pub use state::{RouteEvent, RouterState};

use crate::provider::{
    ErrorKind, GenerationAttempt, GenerationFailed, GenerationRequest, ModelProvider,
    ProviderError, TextGenerator,
};
use crate::throttle::Sleeper;

/// Routes generation requests across primary candidates and the keyless client.
pub struct ProviderRouter {
    /// Credentialed provider; `None` when no credential is configured
    primary: Option<Arc<dyn ModelProvider>>,
    /// Candidates sorted by ascending priority
    candidates: Vec<ProviderCandidate>,
    /// Last-resort generator
    fallback: Arc<dyn TextGenerator>,
    sleeper: Arc<dyn Sleeper>,
    /// Extra same-candidate attempts on transient failures
    max_retries: u32,
    retry_delay: Duration,
    state: Mutex<RouterState>,
}

impl ProviderRouter {
    /// Create a router over a credentialed provider.
    ///
    /// Candidates are tried in ascending priority; ties keep configuration order.
    pub fn new(
        primary: Arc<dyn ModelProvider>,
        mut candidates: Vec<ProviderCandidate>,
        fallback: Arc<dyn TextGenerator>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        candidates.sort_by_key(|candidate| candidate.priority);
        let state = RouterState::initial(!candidates.is_empty());
        Self {
            primary: Some(primary),
            candidates,
            fallback,
            sleeper,
            max_retries: 0,
            retry_delay: Duration::ZERO,
            state: Mutex::new(state),
        }
    }

    /// Create a router with no credential: every call goes to `fallback`.
    pub fn keyless_only(fallback: Arc<dyn TextGenerator>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            primary: None,
            candidates: Vec::new(),
            fallback,
            sleeper,
            max_retries: 0,
            retry_delay: Duration::ZERO,
            state: Mutex::new(RouterState::FallbackKeyless),
        }
    }

    /// Same-candidate retry budget for transient failures.
    pub fn with_retry_policy(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn candidates(&self) -> &[ProviderCandidate] {
        &self.candidates
    }

    /// Snapshot of the current routing state.
    pub fn state(&self) -> RouterState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sticky_model(&self) -> Option<String> {
        self.state().sticky_model().map(str::to_string)
    }

    /// Generate text for `request`.
    ///
    /// Fails only when the keyless client has also exhausted its retries.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailed> {
        let state = self.state();

        let primary = match &self.primary {
            Some(primary) if !state.is_keyless() => primary,
            Some(_) if self.candidates.is_empty() => {
                return self.generate_keyless(request, "no_candidates").await
            }
            Some(_) => return self.generate_keyless(request, "auth_rejected").await,
            None => return self.generate_keyless(request, "no_credential").await,
        };

        let sticky = state.sticky_model().map(str::to_string);

        for candidate in self.probe_order(&state) {
            match self.try_candidate(primary.as_ref(), candidate, request).await {
                Ok(text) => {
                    self.apply(RouteEvent::PrimarySucceeded(candidate.name.clone()));
                    return Ok(text);
                }
                Err(error) => {
                    let kind = error.kind();
                    if kind == ErrorKind::Auth {
                        tracing::warn!(
                            model = %candidate.name,
                            error = %error,
                            "credential rejected, using keyless provider for the rest of the session"
                        );
                        self.apply(RouteEvent::AuthRejected);
                        return self.generate_keyless(request, "auth").await;
                    }

                    if sticky.as_deref() == Some(candidate.name.as_str()) {
                        self.apply(RouteEvent::StickyFailed);
                    }

                    tracing::info!(
                        model = %candidate.name,
                        error_kind = %kind,
                        "candidate failed, moving to next"
                    );
                }
            }
        }

        tracing::warn!(
            candidates = self.candidates.len(),
            "all primary candidates exhausted, using keyless provider"
        );
        self.generate_keyless(request, "exhausted").await
    }

    /// Sticky model first, then the rest in priority order.
    fn probe_order(&self, state: &RouterState) -> Vec<&ProviderCandidate> {
        match state.sticky_model() {
            Some(sticky) => self
                .candidates
                .iter()
                .filter(|c| c.name == sticky)
                .chain(self.candidates.iter().filter(|c| c.name != sticky))
                .collect(),
            None => self.candidates.iter().collect(),
        }
    }

    /// Call one candidate, retrying only transient failures.
    async fn try_candidate(
        &self,
        primary: &dyn ModelProvider,
        candidate: &ProviderCandidate,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        let provider = format!("{}/{}", primary.name(), candidate.name);
        let max_attempts = self.max_retries + 1;
        let mut attempt = 1;

        loop {
            match primary.generate(&candidate.name, request).await {
                Ok(text) => {
                    GenerationAttempt::succeeded(&provider, attempt).record();
                    return Ok(text);
                }
                Err(error) => {
                    let kind = error.kind();
                    GenerationAttempt::failed(&provider, attempt, kind).record();

                    if !kind.is_transient() || attempt >= max_attempts {
                        return Err(error);
                    }

                    self.sleeper.sleep(self.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn generate_keyless(
        &self,
        request: &GenerationRequest,
        reason: &'static str,
    ) -> Result<String, GenerationFailed> {
        metrics::counter!("postforge_fallbacks_total", "reason" => reason).increment(1);
        tracing::debug!(reason, provider = self.fallback.name(), "routing to keyless provider");
        self.fallback.generate(request).await
    }

    fn apply(&self, event: RouteEvent) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let next = state.clone().transition(event);
        if next != *state {
            tracing::info!(from = ?*state, to = ?next, "router state changed");
        }
        *state = next;
    }
}

#[async_trait]
impl TextGenerator for ProviderRouter {
    fn name(&self) -> &str {
        "router"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailed> {
        ProviderRouter::generate(self, request).await
    }
}
