//! Core configuration types and data structures

use std::{collections::HashMap, time::Duration};

use fastbi_http::HttpConfig;
use serde::{Deserialize, Serialize};

/// Main console configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConsoleConfig {
    /// Console API endpoint and credential
    #[serde(default)]
    pub api: ApiSettings,
    /// Transport settings
    #[serde(default)]
    pub http: HttpSettings,
    /// Data-model repository settings
    #[serde(default)]
    pub repository: RepositorySettings,
}

/// API endpoint configuration
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    /// Base URL of the console API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent as `X-API-KEY`
    #[serde(default)]
    pub key: Option<String>,
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Optional HTTP/HTTPS proxy
    #[serde(default)]
    pub proxy: Option<String>,
    /// Optional user agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Repository link configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RepositorySettings {
    /// Forces the hosting provider instead of detecting it from the URL
    #[serde(default)]
    pub provider: Option<String>,
    /// Repository URL per project id
    #[serde(default)]
    pub urls: HashMap<String, String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key: None,
        }
    }
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            proxy: None,
            user_agent: None,
        }
    }
}

impl ConsoleConfig {
    /// Build the transport configuration for the console API client
    pub fn http_config(&self) -> HttpConfig {
        let mut config = HttpConfig::new()
            .with_base_url(self.api.base_url.clone())
            .with_timeout(Duration::from_secs(self.http.timeout_secs))
            .with_connect_timeout(Duration::from_secs(self.http.connect_timeout_secs));

        if let Some(key) = &self.api.key {
            config = config.with_api_key(key.clone());
        }
        if let Some(proxy) = &self.http.proxy {
            config = config.with_proxy(proxy.clone());
        }
        if let Some(user_agent) = &self.http.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        config
    }

    /// Repository URL registered for a project.
    ///
    /// Matched case-insensitively: the `config` loader lowercases table keys.
    pub fn repository_url(&self, project_id: &str) -> Option<&str> {
        let wanted = project_id.to_lowercase();
        self.repository
            .urls
            .iter()
            .find(|(id, _)| id.to_lowercase() == wanted)
            .map(|(_, url)| url.as_str())
    }
}

fn default_base_url() -> String {
    "http://localhost:8888".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Configuration manager trait
pub trait ConfigManager {
    /// Load configuration
    fn load_config(&mut self) -> Result<ConsoleConfig, crate::error::ConfigError>;
    /// Save configuration
    fn save_config(&self, config: &ConsoleConfig) -> Result<(), crate::error::ConfigError>;
    /// Validate configuration
    fn validate_config(&self, config: &ConsoleConfig) -> Result<(), crate::error::ConfigError>;
}
