//! HTTP client error types

use thiserror::Error;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, HttpError>;

/// HTTP client errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network request failed
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid proxy configuration
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// API key could not be encoded as a header value
    #[error("Invalid API key header: {0}")]
    InvalidApiKey(String),

    /// HTTP error status
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Response body was not the expected JSON
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),
}

impl HttpError {
    /// HTTP status of the failed response, if the server answered
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            HttpError::HttpStatus { status, .. } => Some(*status),
            HttpError::RequestFailed(e) => e.status(),
            _ => None,
        }
    }

    /// Message the server put in a JSON error body (`{"message": "..."}`)
    ///
    /// Returns `None` for transport failures and for error bodies that are not
    /// JSON objects with a string `message` field.
    pub fn server_message(&self) -> Option<String> {
        let HttpError::HttpStatus { message, .. } = self else {
            return None;
        };

        let body: serde_json::Value = serde_json::from_str(message).ok()?;
        body.get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }
}
