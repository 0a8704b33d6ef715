//! Editor error types

use std::fmt;

use fastbi_http::HttpError;
use thiserror::Error;

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// YAML text that could not be turned back into a configuration mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable parser message
    pub message: String,
    /// 1-based line of the failure, when known
    pub line: Option<usize>,
    /// 1-based column of the failure, when known
    pub column: Option<usize>,
}

impl ParseError {
    /// Create a parse error without position information
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err.location();
        Self {
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// Editor errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// Text is not valid YAML
    #[error("Invalid YAML: {0}")]
    Parse(#[from] ParseError),

    /// Save attempted with unparsable text; nothing was sent
    #[error("Cannot save invalid YAML: {0}")]
    Validation(ParseError),

    /// Network or HTTP failure without a server explanation
    #[error("Request failed: {0}")]
    Transport(#[source] HttpError),

    /// Server answered and refused the change
    #[error("{0}")]
    ServerRejection(String),

    /// Operation needs an open session
    #[error("No configuration is open")]
    NotOpen,

    /// Another save of this editor is still in flight
    #[error("A save is already in progress")]
    Busy,

    /// Repository URL could not be turned into a branch link
    #[error("Invalid repository URL: {0}")]
    InvalidRepositoryUrl(String),
}

impl From<HttpError> for EditorError {
    fn from(err: HttpError) -> Self {
        match err.server_message() {
            Some(message) => EditorError::ServerRejection(message),
            None => EditorError::Transport(err),
        }
    }
}
