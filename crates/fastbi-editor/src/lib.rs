//! YAML configuration editor for FastBI dbt projects
//!
//! A [`ConfigEditor`] edits one configuration resource kind (project
//! variables or dbt profiles). It loads the remote document, exposes it as
//! YAML text, validates and normalizes edits, and saves them back. Every save
//! proposes a new branch in the project's data-model repository.
//!
//! Hosts embed the editor by passing collaborators into
//! [`ConfigEditor::new`]: a [`ConfigSource`] (normally [`ProjectApi`]), a
//! [`NotificationSink`], a [`CloseConfirmation`] and optionally a
//! [`RepositoryLocator`] for branch links.

pub mod api;
pub mod branch;
pub mod codec;
pub mod dirty;
pub mod error;
pub mod host;
pub mod resource;
pub mod session;

pub use api::{ConfigSource, ProjectApi, SaveRequest, SaveResponse};
pub use branch::{branch_url, BranchNamer, RepoProvider};
pub use codec::{deserialize, serialize, validate, ValidationOutcome};
pub use dirty::is_dirty;
pub use error::{EditorError, ParseError, Result};
pub use host::{
    AlwaysDiscard, CloseConfirmation, MemoryNotifier, NeverDiscard, NotificationSink,
    RepositoryLocator, Severity, StaticRepositories, TracingNotifier,
};
pub use resource::{ConfigDocument, ResourceKind};
pub use session::{CloseOutcome, ConfigEditor, OpenOutcome, SaveResult, SessionPhase};

/// Re-export of the mapping type documents are held in
pub use serde_yaml::Mapping;
