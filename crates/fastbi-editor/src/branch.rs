//! Branch naming and repository branch links

use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicI64, Ordering},
};

use chrono::Utc;
use url::Url;

use crate::error::{EditorError, Result};

/// Mints time-based branch names that are unique per namer.
///
/// Names are `<prefix>_<epoch millis>`. The millisecond stamp is strictly
/// increasing across calls, so two saves within the same millisecond still
/// propose different branches.
#[derive(Debug, Default)]
pub struct BranchNamer {
    last: AtomicI64,
}

impl BranchNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next branch name for `prefix` using the wall clock
    pub fn next(&self, prefix: &str) -> String {
        self.next_at(prefix, Utc::now().timestamp_millis())
    }

    /// Next branch name for `prefix` as if the clock read `now_millis`
    pub fn next_at(&self, prefix: &str, now_millis: i64) -> String {
        let stamp = self.reserve(now_millis);
        format!("{}_{}", prefix, stamp)
    }

    /// Branch name for a single-variable update
    pub fn for_variable_update(&self, key: &str) -> String {
        self.next(&format!("update_{}", key))
    }

    fn reserve(&self, now_millis: i64) -> i64 {
        let bump = |last: i64| now_millis.max(last.saturating_add(1));
        let previous = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(bump(last)))
        {
            Ok(previous) | Err(previous) => previous,
        };
        bump(previous)
    }
}

/// Git hosting provider of a data-model repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoProvider {
    GitHub,
    GitLab,
    Bitbucket,
    Gitea,
    /// Unrecognized host; links use the GitLab layout
    Unknown,
}

impl RepoProvider {
    /// Guess the provider from the repository host name
    pub fn detect(repo_url: &str) -> Self {
        let host = Url::parse(repo_url.trim())
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
            .unwrap_or_default();

        if host.contains("github") {
            RepoProvider::GitHub
        } else if host.contains("gitlab") {
            RepoProvider::GitLab
        } else if host.contains("bitbucket") {
            RepoProvider::Bitbucket
        } else if host.contains("gitea") {
            RepoProvider::Gitea
        } else {
            RepoProvider::Unknown
        }
    }

    /// Path segments placed between the repository path and the branch name
    fn branch_path(&self) -> &'static str {
        match self {
            RepoProvider::GitHub => "tree",
            RepoProvider::GitLab | RepoProvider::Unknown => "-/tree",
            RepoProvider::Bitbucket => "src",
            RepoProvider::Gitea => "src/branch",
        }
    }

    fn uses_ref_type(&self) -> bool {
        matches!(self, RepoProvider::GitLab | RepoProvider::Unknown)
    }
}

impl fmt::Display for RepoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepoProvider::GitHub => "github",
            RepoProvider::GitLab => "gitlab",
            RepoProvider::Bitbucket => "bitbucket",
            RepoProvider::Gitea => "gitea",
            RepoProvider::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl FromStr for RepoProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(RepoProvider::GitHub),
            "gitlab" => Ok(RepoProvider::GitLab),
            "bitbucket" => Ok(RepoProvider::Bitbucket),
            "gitea" | "forgejo" => Ok(RepoProvider::Gitea),
            "unknown" | "other" => Ok(RepoProvider::Unknown),
            other => Err(format!("unknown repository provider '{}'", other)),
        }
    }
}

/// Build the provider's "view branch" link for a repository.
///
/// Any `.git` suffix, trailing slash, query, fragment and existing branch view
/// (`/tree/..`, `/-/tree/..`, `/src/..`) are dropped from `base_url` first, so
/// a link to another branch can be passed in as well.
pub fn branch_url(base_url: &str, branch_name: &str, provider: RepoProvider) -> Result<String> {
    let invalid = |reason: &str| EditorError::InvalidRepositoryUrl(format!("{}: {}", reason, base_url));

    let branch: Vec<&str> = branch_name.split('/').filter(|s| !s.is_empty()).collect();
    if branch.is_empty() {
        return Err(invalid("empty branch name"));
    }

    let mut url = Url::parse(base_url.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("unsupported scheme"));
    }

    let mut repo: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if let Some(pos) = repo.iter().position(|s| s == "tree" || s == "src") {
        let cut = if pos > 0 && repo[pos - 1] == "-" { pos - 1 } else { pos };
        repo.truncate(cut);
    }
    if repo.last().map(String::as_str) == Some("-") {
        repo.pop();
    }
    if let Some(last) = repo.last_mut() {
        if let Some(stripped) = last.strip_suffix(".git") {
            *last = stripped.to_string();
        }
    }
    if repo.iter().all(|s| s.is_empty()) {
        return Err(invalid("missing repository path"));
    }

    let path = format!(
        "/{}/{}/{}",
        repo.join("/"),
        provider.branch_path(),
        branch.join("/")
    );
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    if provider.uses_ref_type() {
        url.query_pairs_mut().append_pair("ref_type", "heads");
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_names_use_prefix_and_millis() {
        let namer = BranchNamer::new();
        assert_eq!(
            namer.next_at("cicd_workflow_variables", 123),
            "cicd_workflow_variables_123"
        );
    }

    #[test]
    fn test_branch_names_strictly_increase() {
        let namer = BranchNamer::new();
        assert_eq!(namer.next_at("p", 1_000), "p_1000");
        assert_eq!(namer.next_at("p", 1_000), "p_1001");
        assert_eq!(namer.next_at("p", 999), "p_1002");
        assert_eq!(namer.next_at("p", 5_000), "p_5000");
    }

    #[test]
    fn test_wall_clock_names_are_unique() {
        let namer = BranchNamer::new();
        let first = namer.next("dbt_project_profiles_config");
        let second = namer.next("dbt_project_profiles_config");
        assert_ne!(first, second);
        assert!(first.starts_with("dbt_project_profiles_config_"));
    }

    #[test]
    fn test_variable_update_branch() {
        let namer = BranchNamer::new();
        assert!(namer.for_variable_update("DAG_OWNER").starts_with("update_DAG_OWNER_"));
    }

    #[test]
    fn test_detect_provider() {
        assert_eq!(RepoProvider::detect("https://github.com/acme/models"), RepoProvider::GitHub);
        assert_eq!(RepoProvider::detect("https://gitlab.acme.io/data/models"), RepoProvider::GitLab);
        assert_eq!(RepoProvider::detect("https://bitbucket.org/acme/models"), RepoProvider::Bitbucket);
        assert_eq!(RepoProvider::detect("https://gitea.acme.io/data/models"), RepoProvider::Gitea);
        assert_eq!(RepoProvider::detect("https://git.acme.io/data/models"), RepoProvider::Unknown);
        assert_eq!(RepoProvider::detect("not a url"), RepoProvider::Unknown);
    }

    #[test]
    fn test_github_url() {
        let url = branch_url("https://github.com/acme/models.git", "feat_1", RepoProvider::GitHub).unwrap();
        assert_eq!(url, "https://github.com/acme/models/tree/feat_1");
    }

    #[test]
    fn test_gitlab_url() {
        let url = branch_url("https://gitlab.com/data/dbt/models/", "cicd_workflow_variables_1", RepoProvider::GitLab).unwrap();
        assert_eq!(
            url,
            "https://gitlab.com/data/dbt/models/-/tree/cicd_workflow_variables_1?ref_type=heads"
        );
    }

    #[test]
    fn test_bitbucket_url() {
        let url = branch_url("https://bitbucket.org/acme/models", "b1", RepoProvider::Bitbucket).unwrap();
        assert_eq!(url, "https://bitbucket.org/acme/models/src/b1");
    }

    #[test]
    fn test_gitea_url() {
        let url = branch_url("https://gitea.acme.io/data/models", "b1", RepoProvider::Gitea).unwrap();
        assert_eq!(url, "https://gitea.acme.io/data/models/src/branch/b1");
    }

    #[test]
    fn test_unknown_provider_uses_gitlab_layout() {
        let url = branch_url("https://git.acme.io/data/models", "b1", RepoProvider::Unknown).unwrap();
        assert_eq!(url, "https://git.acme.io/data/models/-/tree/b1?ref_type=heads");
    }

    #[test]
    fn test_existing_branch_view_is_replaced() {
        let url = branch_url(
            "https://gitlab.com/data/models/-/tree/main?ref_type=heads",
            "b2",
            RepoProvider::GitLab,
        )
        .unwrap();
        assert_eq!(url, "https://gitlab.com/data/models/-/tree/b2?ref_type=heads");

        let url = branch_url("https://github.com/acme/models/tree/main/dbt", "b2", RepoProvider::GitHub).unwrap();
        assert_eq!(url, "https://github.com/acme/models/tree/b2");
    }

    #[test]
    fn test_branch_with_slashes() {
        let url = branch_url("https://github.com/acme/models", "feature/x", RepoProvider::GitHub).unwrap();
        assert_eq!(url, "https://github.com/acme/models/tree/feature/x");
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            branch_url("", "b1", RepoProvider::GitHub),
            Err(EditorError::InvalidRepositoryUrl(_))
        ));
        assert!(branch_url("ssh://git@github.com/acme/models", "b1", RepoProvider::GitHub).is_err());
        assert!(branch_url("https://github.com/", "b1", RepoProvider::GitHub).is_err());
        assert!(branch_url("https://github.com/acme/models", "", RepoProvider::GitHub).is_err());
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!("GitHub".parse::<RepoProvider>(), Ok(RepoProvider::GitHub));
        assert_eq!("forgejo".parse::<RepoProvider>(), Ok(RepoProvider::Gitea));
        assert!("svn".parse::<RepoProvider>().is_err());
    }
}
