//! Error types for forumscope.

use thiserror::Error;

/// Invalid search option supplied by the caller.
///
/// Raised while validating [`SearchOptions`](crate::search::SearchOptions),
/// which always happens before a scope runs its block and before any request
/// is sent. It indicates misuse, not a runtime condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `top` must be a positive integer
    #[error("Invalid top: {0} (must be a positive integer)")]
    InvalidTop(i64),

    #[error("Unknown criteria: '{0}' (expected one of: broad, narrow)")]
    UnknownCriteria(String),

    #[error("Unknown sortby: '{0}' (expected one of: relevance, views, likes, latest_topic)")]
    UnknownSortBy(String),

    #[error(
        "Unknown status: '{0}' (expected one of: any, open, closed, public, archived, noreplies, single_user, solved, unsolved)"
    )]
    UnknownStatus(String),
}

/// Failure of the forum search pipeline.
///
/// `Network` and `ResponseFormat` are secondary failures: the scope reports
/// them and keeps propagating the user's own failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Transport failure, timeout, or a non-success HTTP status
    #[error("Network error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
    },

    /// The response body could not be read as a search result payload
    #[error("Response format error: {0}")]
    ResponseFormat(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SearchError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Network error without an HTTP status
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a Network error for a non-success HTTP status
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Creates a ResponseFormat error
    pub fn response_format(message: impl Into<String>) -> Self {
        Self::ResponseFormat(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_response_format(&self) -> bool {
        matches!(self, Self::ResponseFormat(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResponseFormat(format!("invalid JSON: {}", err))
    }
}

/// A type alias for `Result<T, SearchError>`.
pub type Result<T> = std::result::Result<T, SearchError>;
