// Command implementations

use std::{fs, path::Path, sync::Arc};

use fastbi_config::{ConfigManager, ConfigManagerTrait, ConsoleConfig};
use fastbi_editor::{
    branch_url, codec, BranchNamer, CloseOutcome, ConfigEditor, EditorError, ProjectApi,
    RepoProvider, RepositoryLocator, ResourceKind,
};
use fastbi_http::shared_client;
use tracing::debug;

use crate::{
    error::{CliError, CliResult},
    host::{repositories_from_config, ConsoleNotifier, StdinConfirmation},
    output,
};

/// Shared state of commands that talk to the console API
pub struct ConsoleContext {
    pub config: ConsoleConfig,
    pub api: Arc<ProjectApi>,
}

impl ConsoleContext {
    /// Load configuration and build the API client
    pub fn load(config_path: Option<&Path>) -> CliResult<Self> {
        let mut manager = match config_path {
            Some(path) => ConfigManager::with_path(path.to_path_buf()),
            None => ConfigManager::new(),
        };
        let config = manager.load_config()?;
        Self::from_config(config)
    }

    pub fn from_config(config: ConsoleConfig) -> CliResult<Self> {
        if config.api.key.is_none() {
            debug!("No API key configured, requests are sent without X-API-KEY");
        }
        let api = Arc::new(ProjectApi::new(shared_client(config.http_config())?));
        Ok(Self { config, api })
    }

    /// Editor wired to the terminal host
    pub fn editor(&self, kind: ResourceKind) -> CliResult<ConfigEditor> {
        let repositories = repositories_from_config(&self.config)?;
        Ok(ConfigEditor::new(
            kind,
            self.api.clone(),
            Arc::new(ConsoleNotifier),
            Arc::new(StdinConfirmation),
        )
        .with_repositories(Arc::new(repositories)))
    }
}

/// Print a project's configuration as YAML
pub async fn show(ctx: &ConsoleContext, kind: ResourceKind, project: &str) -> CliResult<String> {
    let editor = ctx.editor(kind)?;
    editor.open(project).await?;
    let text = editor.text();
    editor.close();
    Ok(text)
}

/// Replace a project's configuration with the content of `file`.
///
/// Returns `None` without creating a branch when the file matches the remote
/// configuration.
pub async fn push(
    ctx: &ConsoleContext,
    kind: ResourceKind,
    project: &str,
    file: &Path,
) -> CliResult<Option<fastbi_editor::SaveResult>> {
    let text = fs::read_to_string(file)?;

    let editor = ctx.editor(kind)?;
    editor.open(project).await?;

    if !fastbi_editor::is_dirty(&text, &editor.baseline()) {
        output::print_info("No changes compared to the remote configuration, nothing to save");
        editor.close();
        return Ok(None);
    }
    editor.edit(text)?;

    let outcome = editor.validate()?;
    if !outcome.valid {
        return Err(EditorError::Validation(fastbi_editor::ParseError::new(outcome.message)).into());
    }

    // A failed save keeps the edits dirty, so the session is dropped instead of closed
    let result = editor.save().await?;
    if editor.close() == CloseOutcome::Cancelled {
        debug!("Session still dirty after save");
    }
    Ok(Some(result))
}

/// Check a local YAML file
pub fn validate_file(file: &Path) -> CliResult<codec::ValidationOutcome> {
    let text = fs::read_to_string(file)?;
    Ok(codec::validate(&text))
}

/// Normalize a local YAML file, optionally in place
pub fn fmt_file(file: &Path, write: bool) -> CliResult<String> {
    let text = fs::read_to_string(file)?;
    let formatted = codec::serialize(&codec::deserialize(&text).map_err(EditorError::Parse)?);
    if write && formatted != text {
        fs::write(file, &formatted)?;
    }
    Ok(formatted)
}

/// Change one variable on a new branch
pub async fn set_var(
    ctx: &ConsoleContext,
    project: &str,
    key: &str,
    value: &str,
) -> CliResult<(String, Option<String>)> {
    if key.trim().is_empty() {
        return Err(CliError::InvalidArgument {
            message: "variable key must not be empty".to_string(),
        });
    }

    let value = parse_scalar(value);
    let branch = BranchNamer::new().for_variable_update(key);
    let response = ctx.api.update_variable(project, key, value, &branch).await?;
    let branch = response.branch_name.unwrap_or(branch);

    let repositories = repositories_from_config(&ctx.config)?;
    let link = repositories
        .repository_url(project)
        .and_then(|repo| branch_url(&repo, &branch, repositories.provider(&repo)).ok());

    Ok((branch, link))
}

/// Build a branch link without contacting the API
pub fn branch_link(repo_url: &str, branch: &str, provider: Option<RepoProvider>) -> CliResult<String> {
    let provider = provider.unwrap_or_else(|| RepoProvider::detect(repo_url));
    Ok(branch_url(repo_url, branch, provider)?)
}

/// Interpret a command-line value the way a scalar reads in the YAML editor
fn parse_scalar(value: &str) -> serde_yaml::Value {
    use serde_yaml::Value;

    if value.trim().is_empty() || value.trim_start().starts_with('#') {
        return Value::String(value.to_string());
    }
    match serde_yaml::from_str::<Value>(value) {
        Ok(scalar @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_))) => scalar,
        _ => Value::String(value.to_string()),
    }
}
