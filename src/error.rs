/// Error types shared across the extension contexts
use thiserror::Error;

/// Failure of a single call to the analysis endpoint
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Refused locally; an empty batch is never sent
    #[error("no comments to analyze")]
    EmptyBatch,

    /// Endpoint answered with a non-success status
    #[error("server error ({status}): {body}")]
    Status { status: u16, body: String },

    /// Connection refused, DNS failure, CORS rejection...
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0} ms")]
    TimedOut(u64),

    /// A success response whose body is not JSON at all
    #[error("unreadable response: {0}")]
    Unreadable(String),

    /// JSON that does not describe a sentiment summary
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl AnalysisError {
    /// Whether the user gets an out-of-band alert in addition to the empty panel
    pub fn should_alert(&self) -> bool {
        matches!(
            self,
            AnalysisError::Status { .. }
                | AnalysisError::Network(_)
                | AnalysisError::TimedOut(_)
                | AnalysisError::Unreadable(_)
        )
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::Network(err.to_string())
    }
}

/// Failure of a command sent from the popup to the page
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    #[error("another command is already in flight")]
    Busy,

    /// The page could not receive the message; the content script is not
    /// running there
    #[error("extension not active on this page: {0}")]
    Unreachable(String),

    #[error("unexpected response: {0}")]
    BadResponse(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid config object: {0}")]
    Decode(String),

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("comment selector must not be empty")]
    EmptySelector,
}
