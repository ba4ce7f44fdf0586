//! Error types for the backend client.

use thiserror::Error;

/// Failure of a single `/ask` call.
///
/// Every variant means the same thing to the conversation: the backend was
/// unreachable or answered badly. The variants exist for diagnostics only.
#[derive(Error, Debug)]
pub enum AskError {
    /// The configured base URL does not form a valid endpoint.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Connection refused, timeout, or the body could not be read.
    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Body was not a valid answer document.
    #[error("Malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias for backend calls.
pub type Result<T> = std::result::Result<T, AskError>;
