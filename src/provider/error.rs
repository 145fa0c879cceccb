//! Provider error types and failure classification.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by a single outbound provider call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Network connectivity error (DNS, connection refused, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned a non-success HTTP status.
    #[error("Provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response body was empty, truncated, or not in the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client is misconfigured (missing credential, unusable base URL).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Map a transport error from `reqwest` into a provider error.
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout(timeout.as_millis() as u64)
        } else if error.is_decode() {
            ProviderError::InvalidResponse(error.to_string())
        } else {
            ProviderError::Network(error.to_string())
        }
    }

    /// Classify this failure.
    ///
    /// Total over every variant: a missing or rejected credential is `Auth`,
    /// anything HTTP-shaped is classified by status code only.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout(_) => ErrorKind::NetworkFailure,
            ProviderError::Upstream { status, .. } => ErrorKind::from_status(*status),
            ProviderError::InvalidResponse(_) => ErrorKind::MalformedResponse,
            ProviderError::Configuration(_) => ErrorKind::Auth,
        }
    }
}

/// Classification of a failed generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing credential (401, 403).
    Auth,
    /// Provider throttled the caller (429).
    RateLimited,
    /// Provider-side failure (5xx).
    TransientServer,
    /// Body unusable, or a request the provider refused for any other reason.
    MalformedResponse,
    /// Timeout, DNS failure, connection reset (also 408).
    NetworkFailure,
}

impl ErrorKind {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Auth,
            429 => ErrorKind::RateLimited,
            408 => ErrorKind::NetworkFailure,
            500..=599 => ErrorKind::TransientServer,
            _ => ErrorKind::MalformedResponse,
        }
    }

    /// Worth retrying against the same provider/model.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::TransientServer | ErrorKind::NetworkFailure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::TransientServer => "transient_server",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::NetworkFailure => "network_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a logical generation request, after all retries and
/// fallbacks were spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Generation failed via {provider}: {last_error}")]
pub struct GenerationFailed {
    /// Provider that produced the last error
    pub provider: String,
    /// Last error observed before giving up
    pub last_error: ProviderError,
}

impl GenerationFailed {
    pub fn new(provider: impl Into<String>, last_error: ProviderError) -> Self {
        Self {
            provider: provider.into(),
            last_error,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.last_error.kind()
    }
}
