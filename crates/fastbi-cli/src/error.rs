// CLI error types and user-facing messages

use fastbi_config::ConfigError;
use fastbi_editor::EditorError;
use fastbi_http::HttpError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!("Invalid argument: {}\n\nRun 'fastbi --help' for usage information.", message)
            }
            CliError::Io(e) => {
                format!("File operation failed: {}", e)
            }
            CliError::Config(e) => {
                format!(
                    "Configuration error: {}\n\nCheck ~/.config/fastbi/console.toml or the FASTBI__* environment variables.",
                    e
                )
            }
            CliError::Http(e) => {
                format!("Could not set up the API client: {}", e)
            }
            CliError::Editor(EditorError::Transport(e)) => {
                format!("Request to the console API failed: {}\n\nNothing was retried; run the command again.", e)
            }
            CliError::Editor(e) => e.to_string(),
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

pub type CliResult<T> = Result<T, CliError>;
