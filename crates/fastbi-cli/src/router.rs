// Command routing and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fastbi_editor::{EditorError, ParseError, RepoProvider, ResourceKind};

use crate::{
    commands::{self, ConsoleContext},
    error::CliResult,
    output,
};

/// FastBI console - edit project variables and dbt profiles
#[derive(Parser, Debug)]
#[command(name = "fastbi")]
#[command(bin_name = "fastbi")]
#[command(about = "Edit FastBI project variables and dbt profiles")]
#[command(
    long_about = "Edit FastBI project configuration from the terminal.\n\nEvery save is proposed on a new repository branch for review:\n  • fastbi show variables <PROJECT>\n  • fastbi push profiles <PROJECT> --file profiles.yml\n  • fastbi set-var <PROJECT> DAG_OWNER analytics"
)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: ~/.config/fastbi/console.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print a project's configuration as YAML
    Show {
        /// variables or profiles
        #[arg(value_name = "KIND")]
        kind: ResourceKind,

        /// Project identifier
        #[arg(value_name = "PROJECT")]
        project: String,
    },

    /// Save a local YAML file as the project's configuration on a new branch
    Push {
        #[arg(value_name = "KIND")]
        kind: ResourceKind,

        #[arg(value_name = "PROJECT")]
        project: String,

        /// YAML file with the full document
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Check that a local file is valid YAML
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print a local YAML file in canonical form
    Fmt {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Rewrite the file in place
        #[arg(long)]
        write: bool,
    },

    /// Change one project variable on a new branch
    SetVar {
        #[arg(value_name = "PROJECT")]
        project: String,

        #[arg(value_name = "KEY")]
        key: String,

        /// Parsed as a YAML scalar, anything else is sent as a string
        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Print the web link of a branch
    BranchUrl {
        #[arg(value_name = "REPO_URL")]
        repo_url: String,

        #[arg(value_name = "BRANCH")]
        branch: String,

        /// github, gitlab, bitbucket or gitea (default: detected from host)
        #[arg(long)]
        provider: Option<RepoProvider>,
    },
}

/// Route and execute commands
pub struct CommandRouter;

impl CommandRouter {
    pub async fn route(cli: Cli) -> CliResult<()> {
        let Cli {
            command, config, ..
        } = cli;

        match command {
            Commands::Show { kind, project } => {
                let ctx = ConsoleContext::load(config.as_deref())?;
                let text = commands::show(&ctx, kind, &project).await?;
                print!("{}", text);
                Ok(())
            }
            Commands::Push {
                kind,
                project,
                file,
            } => {
                let ctx = ConsoleContext::load(config.as_deref())?;
                if let Some(result) = commands::push(&ctx, kind, &project, &file).await? {
                    println!("{}", result.branch_name);
                }
                Ok(())
            }
            Commands::Validate { file } => {
                let outcome = commands::validate_file(&file)?;
                if !outcome.valid {
                    return Err(EditorError::Validation(ParseError::new(outcome.message)).into());
                }
                output::print_success(&outcome.message);
                Ok(())
            }
            Commands::Fmt { file, write } => {
                let formatted = commands::fmt_file(&file, write)?;
                if write {
                    output::print_success(&format!("Formatted {}", file.display()));
                } else {
                    print!("{}", formatted);
                }
                Ok(())
            }
            Commands::SetVar {
                project,
                key,
                value,
            } => {
                let ctx = ConsoleContext::load(config.as_deref())?;
                let (branch, link) = commands::set_var(&ctx, &project, &key, &value).await?;
                let mut message = format!("Variable {} updated. Branch created: {}.", key, branch);
                if let Some(link) = link {
                    message.push_str(&format!(" Open branch: {}", link));
                }
                output::print_success(&message);
                println!("{}", branch);
                Ok(())
            }
            Commands::BranchUrl {
                repo_url,
                branch,
                provider,
            } => {
                println!("{}", commands::branch_link(&repo_url, &branch, provider)?);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_push() {
        let cli = Cli::try_parse_from([
            "fastbi", "push", "profiles", "proj1", "--file", "profiles.yml", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Push {
                kind,
                project,
                file,
            } => {
                assert_eq!(kind, ResourceKind::Profiles);
                assert_eq!(project, "proj1");
                assert_eq!(file, PathBuf::from("profiles.yml"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_branch_url_provider() {
        let cli = Cli::try_parse_from([
            "fastbi",
            "branch-url",
            "https://git.example.com/acme/models",
            "b1",
            "--provider",
            "gitea",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::BranchUrl {
                provider: Some(RepoProvider::Gitea),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(Cli::try_parse_from(["fastbi", "show", "secrets", "proj1"]).is_err());
    }

    #[tokio::test]
    async fn test_validate_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "a: [1,2").unwrap();

        let cli = Cli::try_parse_from(["fastbi", "validate", path.to_str().unwrap()]).unwrap();
        assert!(matches!(
            CommandRouter::route(cli).await,
            Err(crate::CliError::Editor(EditorError::Validation(_)))
        ));
    }
}
