//! Collaborators a host passes into the editor

use std::{collections::HashMap, fmt};

use parking_lot::Mutex;
use tracing::{error, info};

use crate::branch::RepoProvider;

/// Severity of a host notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

/// Receives human-readable results and failures
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Asked before unsaved edits are thrown away
pub trait CloseConfirmation: Send + Sync {
    /// Return `true` to discard the edits of `owner_id` and close
    fn confirm_discard(&self, owner_id: &str) -> bool;
}

/// Finds the data-model repository of a project, for branch links
pub trait RepositoryLocator: Send + Sync {
    fn repository_url(&self, owner_id: &str) -> Option<String>;

    /// Hosting provider of `repo_url`
    fn provider(&self, repo_url: &str) -> RepoProvider {
        RepoProvider::detect(repo_url)
    }
}

/// Sink that writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => error!("{}", message),
            Severity::Info | Severity::Success => info!(%severity, "{}", message),
        }
    }
}

/// Sink that keeps every notification in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far, oldest first
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().clone()
    }

    /// Most recent notification
    pub fn last(&self) -> Option<(String, Severity)> {
        self.messages.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl NotificationSink for MemoryNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages.lock().push((message.to_string(), severity));
    }
}

/// Confirms every discard
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysDiscard;

impl CloseConfirmation for AlwaysDiscard {
    fn confirm_discard(&self, _owner_id: &str) -> bool {
        true
    }
}

/// Declines every discard
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverDiscard;

impl CloseConfirmation for NeverDiscard {
    fn confirm_discard(&self, _owner_id: &str) -> bool {
        false
    }
}

/// Repository URLs from a fixed table, e.g. loaded from configuration.
///
/// Owner ids are matched case-insensitively; configuration loaders lowercase
/// table keys.
#[derive(Debug, Default, Clone)]
pub struct StaticRepositories {
    urls: HashMap<String, String>,
    provider: Option<RepoProvider>,
}

impl StaticRepositories {
    pub fn new(urls: HashMap<String, String>) -> Self {
        Self {
            urls: urls
                .into_iter()
                .map(|(owner_id, url)| (owner_id.to_lowercase(), url))
                .collect(),
            provider: None,
        }
    }

    /// Use `provider` for every repository instead of detecting it
    pub fn with_provider(mut self, provider: RepoProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn insert(&mut self, owner_id: impl Into<String>, url: impl Into<String>) {
        self.urls.insert(owner_id.into().to_lowercase(), url.into());
    }
}

impl RepositoryLocator for StaticRepositories {
    fn repository_url(&self, owner_id: &str) -> Option<String> {
        self.urls.get(&owner_id.to_lowercase()).cloned()
    }

    fn provider(&self, repo_url: &str) -> RepoProvider {
        self.provider
            .unwrap_or_else(|| RepoProvider::detect(repo_url))
    }
}
