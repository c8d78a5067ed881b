//! Error taxonomy shared by the server endpoint and the upload client.
//!
//! Three layers:
//!
//! * [`ErrorKind`] is the closed set of outcomes a caller can observe. Each
//!   kind carries a stable tag and the short message shown to end users.
//! * [`ProviderError`] describes what went wrong talking to the model
//!   provider, classified from the provider's structured error where it has
//!   one.
//! * [`ExtractionError`] is what the extraction service returns: a provider
//!   failure or output that does not match the requested schema.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingInput,
    InvalidFormat,
    SizeLimit,
    RateLimited,
    QuotaExceeded,
    UnknownProcessingError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingInput => "missing-input",
            ErrorKind::InvalidFormat => "invalid-format",
            ErrorKind::SizeLimit => "size-limit",
            ErrorKind::RateLimited => "rate-limited",
            ErrorKind::QuotaExceeded => "quota-exceeded",
            ErrorKind::UnknownProcessingError => "unknown-processing-error",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::MissingInput => "No file provided",
            ErrorKind::InvalidFormat => "File must be a PDF",
            ErrorKind::SizeLimit => "File size must be less than 10MB",
            ErrorKind::RateLimited => "Rate limit exceeded. Please try again later.",
            ErrorKind::QuotaExceeded => "API quota exceeded. Please check your API key.",
            ErrorKind::UnknownProcessingError => "Failed to process PDF. Please try again.",
        }
    }

    /// Caused by the upload itself; detected before any provider call.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            ErrorKind::MissingInput | ErrorKind::InvalidFormat | ErrorKind::SizeLimit
        )
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        [
            ErrorKind::MissingInput,
            ErrorKind::InvalidFormat,
            ErrorKind::SizeLimit,
            ErrorKind::RateLimited,
            ErrorKind::QuotaExceeded,
            ErrorKind::UnknownProcessingError,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == tag)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rate limit: {message}")]
    RateLimited { message: String },

    #[error("provider quota exhausted: {message}")]
    QuotaExceeded { message: String },

    #[error("provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request to provider failed: {0}")]
    Transport(reqwest::Error),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider error: {0}")]
    Other(String),
}

/// The URL is dropped so request details such as credentials stay out of
/// messages and logs.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.without_url())
    }
}

impl ProviderError {
    /// Worth another attempt with backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } => true,
            ProviderError::Api { status, .. } => *status >= 500,
            ProviderError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ProviderError::QuotaExceeded { .. }
            | ProviderError::MalformedResponse(_)
            | ProviderError::Other(_) => false,
        }
    }

    /// Tagged-variant mapping first; errors without a structured code fall
    /// back to matching their message text.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::RateLimited { .. } => ErrorKind::RateLimited,
            ProviderError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            ProviderError::Api { message, .. } | ProviderError::Other(message) => {
                kind_from_message(message)
            }
            ProviderError::Transport(_) | ProviderError::MalformedResponse(_) => {
                ErrorKind::UnknownProcessingError
            }
        }
    }
}

/// Substring fallback for provider messages with no usable error code.
/// Matching ignores case: "Quota exceeded" and "quota exceeded" are the
/// same failure.
pub fn kind_from_message(message: &str) -> ErrorKind {
    let lowered = message.to_lowercase();
    if lowered.contains("rate limit") {
        ErrorKind::RateLimited
    } else if lowered.contains("quota") {
        ErrorKind::QuotaExceeded
    } else {
        ErrorKind::UnknownProcessingError
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("model output does not match the requested schema: {0}")]
    SchemaViolation(#[source] serde_json::Error),
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::Provider(e) => e.kind(),
            ExtractionError::SchemaViolation(_) => ErrorKind::UnknownProcessingError,
        }
    }
}
