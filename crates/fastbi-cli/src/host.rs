// Terminal implementations of the editor's host collaborators

use std::io::{self, BufRead, Write};

use fastbi_config::ConsoleConfig;
use fastbi_editor::{
    CloseConfirmation, NotificationSink, RepoProvider, Severity, StaticRepositories,
};

use crate::{
    error::{CliError, CliResult},
    output,
};

/// Prints editor notifications to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success => output::print_success(message),
            Severity::Error => output::print_error(message),
            Severity::Info => output::print_info(message),
        }
    }
}

/// Asks on the terminal before unsaved edits are dropped
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirmation;

impl CloseConfirmation for StdinConfirmation {
    fn confirm_discard(&self, owner_id: &str) -> bool {
        eprint!(
            "You have unsaved changes for '{}'. Are you sure you want to close? [y/N] ",
            owner_id
        );
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Repository table from the `[repository]` config section
pub fn repositories_from_config(config: &ConsoleConfig) -> CliResult<StaticRepositories> {
    let repositories = StaticRepositories::new(config.repository.urls.clone());

    match &config.repository.provider {
        Some(name) => {
            let provider = name
                .parse::<RepoProvider>()
                .map_err(|message| CliError::InvalidArgument { message })?;
            Ok(repositories.with_provider(provider))
        }
        None => Ok(repositories),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastbi_editor::RepositoryLocator;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_repositories_from_config() {
        let mut config = ConsoleConfig::default();
        config
            .repository
            .urls
            .insert("proj1".to_string(), "https://git.acme.io/data/models".to_string());
        config.repository.provider = Some("gitea".to_string());

        let repos = repositories_from_config(&config).unwrap();
        let url = repos.repository_url("proj1").unwrap();
        assert_eq!(repos.provider(&url), RepoProvider::Gitea);
    }

    #[test]
    fn test_mixed_case_project_from_config_file() {
        use fastbi_config::{ConfigManager, ConfigManagerTrait};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        std::fs::write(
            &path,
            "[repository.urls]\nSalesMart = \"https://github.com/acme/sales.git\"\n",
        )
        .unwrap();
        let config = ConfigManager::with_path(path)
            .with_env_prefix("FASTBI_CLI_TEST_MIXED_CASE")
            .load_config()
            .unwrap();

        let repos = repositories_from_config(&config).unwrap();
        let url = repos.repository_url("SalesMart").unwrap();
        let link = fastbi_editor::branch_url(&url, "b1", repos.provider(&url)).unwrap();
        assert_eq!(link, "https://github.com/acme/sales/tree/b1");
    }

    #[test]
    fn test_unknown_provider_in_config() {
        let mut config = ConsoleConfig::default();
        config.repository.provider = Some("svn".to_string());
        assert!(matches!(
            repositories_from_config(&config),
            Err(CliError::InvalidArgument { .. })
        ));
    }
}
