//! FastBI console configuration
//!
//! Loads the API endpoint, credential, transport timeouts and repository
//! settings from layered sources: built-in defaults, the user config file,
//! an explicit file and `FASTBI__*` environment variables.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use types::{
    ApiSettings, ConfigManager as ConfigManagerTrait, ConsoleConfig, HttpSettings,
    RepositorySettings,
};
