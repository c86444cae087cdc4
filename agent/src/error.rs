use crate::analyzer::transport::TransportFailure;
use thiserror::Error;
use tracing::warn;

/// Longest provider detail that reaches the log.
pub const LOG_DETAIL_CHARS: usize = 300;

/// Every failure the advisor surfaces. `Display` is the user-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdvisorError {
    /// Credential absent or placeholder, or an unreadable setting. Never reaches the network.
    #[error("{0}")]
    Configuration(String),

    #[error("Invalid API key. Please check your Gemini API key.")]
    Authorization,

    #[error("API rate limit exceeded. Please try again later.")]
    RateLimit,

    #[error("Invalid request. Please check your input parameters.")]
    BadRequest,

    /// Network, timeout, 5xx or any status we don't classify.
    #[error("An error occurred while processing your request.")]
    Transport,

    /// Success status but no usable candidate. Carries what we were parsing.
    #[error("Failed to parse {0}")]
    ResponseShape(String),
}

pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Status category of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Authorization,
    RateLimit,
    BadRequest,
    Other,
}

impl FailureCategory {
    /// Total over every status, including none at all (network-level failure).
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(403) => FailureCategory::Authorization,
            Some(429) => FailureCategory::RateLimit,
            Some(400) => FailureCategory::BadRequest,
            _ => FailureCategory::Other,
        }
    }

    pub fn into_error(self) -> AdvisorError {
        match self {
            FailureCategory::Authorization => AdvisorError::Authorization,
            FailureCategory::RateLimit => AdvisorError::RateLimit,
            FailureCategory::BadRequest => AdvisorError::BadRequest,
            FailureCategory::Other => AdvisorError::Transport,
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCategory::Authorization => write!(f, "AUTH"),
            FailureCategory::RateLimit => write!(f, "RATE_LIMIT"),
            FailureCategory::BadRequest => write!(f, "BAD_REQUEST"),
            FailureCategory::Other => write!(f, "OTHER"),
        }
    }
}

/// Map a transport failure to the error the caller sees.
/// The provider's detail is logged here and goes no further.
pub fn classify(failure: &TransportFailure) -> AdvisorError {
    let category = FailureCategory::from_status(failure.status);
    let status = failure
        .status
        .map_or_else(|| "no status".to_string(), |s| s.to_string());
    warn!(
        "Gemini API error [{category}] {status}: {}",
        log_excerpt(&failure.detail)
    );
    category.into_error()
}

fn log_excerpt(detail: &str) -> String {
    detail.chars().take(LOG_DETAIL_CHARS).collect()
}

impl AdvisorError {
    pub fn not_configured() -> Self {
        AdvisorError::Configuration("Gemini API key not configured".to_string())
    }

    /// Relabel a shape failure with the name of what the caller asked for.
    pub fn parsing(self, what: &str) -> Self {
        match self {
            AdvisorError::ResponseShape(_) => AdvisorError::ResponseShape(what.to_string()),
            other => other,
        }
    }
}
