//! Error types for avatar generation.

use std::time::Duration;

/// Maximum length of an upstream error body kept in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while building requests or talking to the
/// generation service.
///
/// Readiness polling never produces one of these: a media URL that is not
/// yet servable is reported through [`crate::readiness::PollOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum AvatarGenError {
    /// Malformed or missing input, rejected before any network activity.
    #[error("invalid request: {0}")]
    Validation(String),

    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The generation call returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay suggested by the `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// Content was rejected by the service's moderation.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The service accepted the call but reported the task as failed.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The service answered without a usable media URL or task id.
    #[error("no media returned: {0}")]
    NoMedia(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error (e.g., reading a reference image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AvatarGenError {
    /// Returns true if this error is likely transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network(_))
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::Network(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Result type alias for avatar generation operations.
pub type Result<T> = std::result::Result<T, AvatarGenError>;

/// Trims an upstream error body so it is safe to show and log.
///
/// Bearer tokens echoed back by a proxy are redacted and overly long bodies
/// are truncated on a char boundary.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len().min(MAX_ERROR_MESSAGE_LEN));
    let mut words = text.split_whitespace().peekable();
    while let Some(word) = words.next() {
        if !cleaned.is_empty() {
            cleaned.push(' ');
        }
        cleaned.push_str(word);
        if word.eq_ignore_ascii_case("bearer") && words.peek().is_some() {
            words.next();
            cleaned.push_str(" [redacted]");
        }
    }

    if cleaned.len() <= MAX_ERROR_MESSAGE_LEN {
        return cleaned;
    }
    let mut end = MAX_ERROR_MESSAGE_LEN;
    while !cleaned.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &cleaned[..end])
}

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
