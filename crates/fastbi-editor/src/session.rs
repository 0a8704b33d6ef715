//! Editor session lifecycle
//!
//! One [`ConfigEditor`] edits one resource kind. Its session moves through
//! `Closed -> Opening -> Open -> Closed`; opening another project replaces the
//! current session without saving it.
//!
//! All methods take `&self`. Session state sits behind a mutex that is never
//! held across an `.await`, and two guards keep concurrent calls honest:
//!
//! - every `open` and `close` bumps a generation counter, and a fetch or save
//!   that resolves after its generation was superseded leaves the session alone
//! - a busy flag rejects a second `save` while one is in flight

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    api::{ConfigSource, SaveRequest},
    branch::{branch_url, BranchNamer},
    codec::{self, ValidationOutcome},
    dirty::is_dirty,
    error::{EditorError, Result},
    host::{CloseConfirmation, NotificationSink, RepositoryLocator, Severity},
    resource::ResourceKind,
};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Closed,
    /// A fetch is in flight
    Opening,
    Open,
}

/// How an `open` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The document is loaded into the buffer
    Loaded,
    /// A later `open` or `close` replaced this one before the fetch resolved
    Superseded,
}

/// How a `close` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The host declined to discard unsaved edits
    Cancelled,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveResult {
    /// Branch the server created for the change
    pub branch_name: String,
    pub success: bool,
    /// Link to the branch, when the project's repository is known
    pub branch_url: Option<String>,
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    owner_id: Option<String>,
    raw_text: String,
    baseline_text: String,
    generation: u64,
    saving: bool,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: SessionPhase::Closed,
            owner_id: None,
            raw_text: String::new(),
            baseline_text: String::new(),
            generation: 0,
            saving: false,
        }
    }

    /// Drop the session and invalidate in-flight requests
    fn reset(&mut self) {
        self.phase = SessionPhase::Closed;
        self.owner_id = None;
        self.raw_text.clear();
        self.baseline_text.clear();
        self.generation += 1;
    }

    fn require_open(&self) -> Result<()> {
        match self.phase {
            SessionPhase::Open => Ok(()),
            _ => Err(EditorError::NotOpen),
        }
    }
}

/// Clears the busy flag when a save finishes or its future is dropped
struct SavingGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().saving = false;
    }
}

/// YAML editor for one configuration resource kind
pub struct ConfigEditor {
    kind: ResourceKind,
    source: Arc<dyn ConfigSource>,
    notifier: Arc<dyn NotificationSink>,
    confirmation: Arc<dyn CloseConfirmation>,
    repositories: Option<Arc<dyn RepositoryLocator>>,
    namer: BranchNamer,
    state: Mutex<SessionState>,
}

impl ConfigEditor {
    pub fn new(
        kind: ResourceKind,
        source: Arc<dyn ConfigSource>,
        notifier: Arc<dyn NotificationSink>,
        confirmation: Arc<dyn CloseConfirmation>,
    ) -> Self {
        Self {
            kind,
            source,
            notifier,
            confirmation,
            repositories: None,
            namer: BranchNamer::new(),
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Attach a repository locator so save results carry a branch link
    pub fn with_repositories(mut self, repositories: Arc<dyn RepositoryLocator>) -> Self {
        self.repositories = Some(repositories);
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.lock().phase
    }

    /// Project of the current session, also while it is still loading
    pub fn owner_id(&self) -> Option<String> {
        self.state.lock().owner_id.clone()
    }

    /// Current editor buffer
    pub fn text(&self) -> String {
        self.state.lock().raw_text.clone()
    }

    /// Text last known to match the remote document
    pub fn baseline(&self) -> String {
        self.state.lock().baseline_text.clone()
    }

    pub fn is_dirty(&self) -> bool {
        let state = self.state.lock();
        is_dirty(&state.raw_text, &state.baseline_text)
    }

    pub fn is_saving(&self) -> bool {
        self.state.lock().saving
    }

    /// Load the configuration of `owner_id`, replacing any current session.
    ///
    /// On failure the editor is closed and the host is notified.
    pub async fn open(&self, owner_id: &str) -> Result<OpenOutcome> {
        let generation = {
            let mut state = self.state.lock();
            if state.phase != SessionPhase::Closed {
                debug!(
                    previous = ?state.owner_id,
                    owner_id,
                    "Replacing open {} session",
                    self.kind
                );
            }
            state.reset();
            state.phase = SessionPhase::Opening;
            state.owner_id = Some(owner_id.to_string());
            state.generation
        };

        let fetched = self.source.fetch(self.kind, owner_id).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(owner_id, "Discarding stale {} fetch", self.kind);
            return Ok(OpenOutcome::Superseded);
        }

        match fetched {
            Ok(document) => {
                let text = codec::serialize(&document.content);
                state.phase = SessionPhase::Open;
                state.raw_text = text.clone();
                state.baseline_text = text;
                info!(owner_id, kind = %self.kind, "Configuration loaded");
                Ok(OpenOutcome::Loaded)
            }
            Err(err) => {
                state.reset();
                drop(state);
                warn!(owner_id, kind = %self.kind, "Failed to load configuration: {}", err);
                self.notifier
                    .notify(&format!("Failed to load {}", self.kind.label()), Severity::Error);
                Err(err)
            }
        }
    }

    /// Replace the editor buffer with `text`. No validation happens here.
    pub fn edit(&self, text: impl Into<String>) -> Result<()> {
        let mut state = self.state.lock();
        state.require_open()?;
        state.raw_text = text.into();
        Ok(())
    }

    /// Check the buffer without changing anything
    pub fn validate(&self) -> Result<ValidationOutcome> {
        let state = self.state.lock();
        state.require_open()?;
        Ok(codec::validate(&state.raw_text))
    }

    /// Normalize the buffer's formatting and return the new text.
    ///
    /// Unparsable text is left exactly as the user typed it.
    pub fn format(&self) -> Result<String> {
        let mut state = self.state.lock();
        state.require_open()?;

        match codec::deserialize(&state.raw_text) {
            Ok(content) => {
                state.raw_text = codec::serialize(&content);
                Ok(state.raw_text.clone())
            }
            Err(err) => {
                drop(state);
                self.notifier.notify(
                    &format!("Cannot format invalid YAML: {}", err),
                    Severity::Error,
                );
                Err(EditorError::Parse(err))
            }
        }
    }

    /// Validate the buffer and propose it as a new branch.
    ///
    /// Invalid text never reaches the network. A failed request leaves the
    /// session as it was so the user can retry; nothing is retried here.
    pub async fn save(&self) -> Result<SaveResult> {
        let (owner_id, text, content, generation) = {
            let mut state = self.state.lock();
            state.require_open()?;
            if state.saving {
                return Err(EditorError::Busy);
            }

            match codec::deserialize(&state.raw_text) {
                Ok(content) => {
                    state.saving = true;
                    (
                        state.owner_id.clone().unwrap_or_default(),
                        state.raw_text.clone(),
                        content,
                        state.generation,
                    )
                }
                Err(err) => {
                    drop(state);
                    self.notifier
                        .notify("Cannot save invalid YAML", Severity::Error);
                    return Err(EditorError::Validation(err));
                }
            }
        };
        let guard = SavingGuard { state: &self.state };

        let request = SaveRequest {
            kind: self.kind,
            owner_id: owner_id.clone(),
            branch_name: self.namer.next(self.kind.branch_prefix()),
            content,
        };
        let saved = self.source.save(&request).await;
        drop(guard);

        let response = match saved {
            Ok(response) => response,
            Err(err) => {
                warn!(owner_id = %owner_id, kind = %self.kind, "Failed to save changes: {}", err);
                self.notifier
                    .notify(&format!("Failed to save changes: {}", err), Severity::Error);
                return Err(err);
            }
        };

        {
            let mut state = self.state.lock();
            if state.generation == generation && state.phase == SessionPhase::Open {
                state.baseline_text = text;
            } else {
                debug!(owner_id = %owner_id, "Session changed while saving, baseline left alone");
            }
        }

        let branch_name = response
            .branch_name
            .filter(|name| !name.is_empty())
            .unwrap_or(request.branch_name);
        let branch_url = self.branch_link(&owner_id, &branch_name);

        info!(owner_id = %owner_id, branch = %branch_name, "Configuration saved");
        self.notifier
            .notify(&success_message(&branch_name, branch_url.as_deref()), Severity::Success);

        Ok(SaveResult {
            branch_name,
            success: true,
            branch_url,
        })
    }

    /// End the session, asking the host first if there are unsaved edits
    pub fn close(&self) -> CloseOutcome {
        let mut state = self.state.lock();

        if state.phase == SessionPhase::Open && is_dirty(&state.raw_text, &state.baseline_text) {
            let owner_id = state.owner_id.clone().unwrap_or_default();
            let generation = state.generation;
            drop(state);

            if !self.confirmation.confirm_discard(&owner_id) {
                debug!(owner_id = %owner_id, "Close cancelled, keeping unsaved edits");
                return CloseOutcome::Cancelled;
            }

            state = self.state.lock();
            if state.generation != generation {
                // Another open or close already replaced the confirmed session.
                return CloseOutcome::Closed;
            }
        }

        if let Some(owner_id) = &state.owner_id {
            debug!(owner_id = %owner_id, kind = %self.kind, "Closing editor");
        }
        state.reset();
        CloseOutcome::Closed
    }

    fn branch_link(&self, owner_id: &str, branch_name: &str) -> Option<String> {
        let repositories = self.repositories.as_ref()?;
        let repo_url = repositories.repository_url(owner_id)?;
        let provider = repositories.provider(&repo_url);

        match branch_url(&repo_url, branch_name, provider) {
            Ok(url) => Some(url),
            Err(err) => {
                warn!("Error generating branch URL: {}", err);
                None
            }
        }
    }
}

fn success_message(branch_name: &str, branch_url: Option<&str>) -> String {
    let mut message = format!(
        "Changes successfully saved. Branch created: {}. Please check your repository.",
        branch_name
    );
    if let Some(url) = branch_url {
        message.push_str(&format!(" Open branch: {}", url));
    }
    message
}
