//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Generation failures carry a classified kind plus an optional retry-after
//! hint so callers can render kind-specific guidance.

use std::time::Duration;
use thiserror::Error;

/// Failure category reported by the generation clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// Rate limit or quota exhaustion on the provider side.
    QuotaExceeded,
    /// Rejected or missing credentials.
    AuthError,
    /// Provider reported itself temporarily unavailable.
    ServiceUnavailable,
    /// Anything the classifier could not pin down.
    Unknown,
    /// The model's output did not contain a parseable structured payload.
    ParseError,
}

/// Classified failure from a generation call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
    /// Hint for callers that want to show a "try again in N" message.
    pub retry_after: Option<Duration>,
}

impl GenerationError {
    /// Maps a raw transport/provider failure onto the error taxonomy.
    ///
    /// Matching is substring-based ("429", "quota", "401", "authentication",
    /// "503", "unavailable", checked in that priority order) against whatever
    /// text the transport produced. Provider wording changes upstream would
    /// change classification; known fragility, kept for compatibility with
    /// the provider's current error strings.
    pub fn classify(raw: &str) -> Self {
        tracing::error!("Gemini API error: {}", raw);

        if raw.contains("429") || raw.contains("quota") {
            return Self {
                kind: GenerationErrorKind::QuotaExceeded,
                message: "Our AI service is currently experiencing high demand. Please try again in a few minutes.".to_string(),
                retry_after: Some(Duration::from_millis(60_000)),
            };
        }

        if raw.contains("401") || raw.contains("authentication") {
            return Self {
                kind: GenerationErrorKind::AuthError,
                message: "AI service authentication error. Please contact support.".to_string(),
                retry_after: None,
            };
        }

        if raw.contains("503") || raw.contains("unavailable") {
            return Self {
                kind: GenerationErrorKind::ServiceUnavailable,
                message: "AI service is temporarily unavailable. Please try again later.".to_string(),
                retry_after: Some(Duration::from_millis(30_000)),
            };
        }

        Self {
            kind: GenerationErrorKind::Unknown,
            message: "An unexpected error occurred with our AI service. Please try again.".to_string(),
            retry_after: None,
        }
    }

    /// Structured-extraction failure. Never retried: malformed output is a
    /// shape problem, not a transient fault.
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::ParseError,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Whether the retry loop should attempt this call again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            GenerationErrorKind::ServiceUnavailable | GenerationErrorKind::Unknown
        )
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
