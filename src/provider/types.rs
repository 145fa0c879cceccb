//! Request and bookkeeping types shared by provider clients.

use super::ErrorKind;

/// One generation call: user prompt plus the system context it runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_context: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, system_context: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_context: system_context.into(),
        }
    }

    /// Single prompt for providers without a separate system channel.
    pub fn combined_prompt(&self) -> String {
        if self.system_context.trim().is_empty() {
            self.prompt.clone()
        } else {
            format!("{}\n\n{}", self.system_context, self.prompt)
        }
    }
}

/// Record of one attempt against one provider, for retry bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationAttempt {
    pub provider: String,
    pub attempt_number: u32,
    pub error_kind: Option<ErrorKind>,
}

impl GenerationAttempt {
    pub fn succeeded(provider: impl Into<String>, attempt_number: u32) -> Self {
        Self {
            provider: provider.into(),
            attempt_number,
            error_kind: None,
        }
    }

    pub fn failed(provider: impl Into<String>, attempt_number: u32, kind: ErrorKind) -> Self {
        Self {
            provider: provider.into(),
            attempt_number,
            error_kind: Some(kind),
        }
    }

    /// Emit this attempt as a structured log event and count it.
    pub fn record(&self) {
        let outcome = self.error_kind.map(ErrorKind::as_str).unwrap_or("success");
        metrics::counter!("postforge_generation_attempts_total",
            "provider" => self.provider.clone(),
            "outcome" => outcome
        )
        .increment(1);

        match self.error_kind {
            None => tracing::debug!(
                provider = %self.provider,
                attempt = self.attempt_number,
                "generation attempt succeeded"
            ),
            Some(kind) => tracing::warn!(
                provider = %self.provider,
                attempt = self.attempt_number,
                error_kind = %kind,
                "generation attempt failed"
            ),
        }
    }
}
