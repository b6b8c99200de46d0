//! Command line argument parsing and validation.

use crate::config::ConfigStore;
use crate::error::Result;
use crate::workflow::WorkflowKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Git release workflow automation
#[derive(Parser, Debug)]
#[command(
    name = "release_flow",
    version,
    about = "Git release workflow automation",
    long_about = "Cut releases of configured git repositories.

A release tags the develop branch for rollback, creates a release branch,
merges production into it (pausing for you on conflicts), tags the version
and pushes a final release branch. Any failure rolls back what was created.

Usage:
  release_flow add api /srv/api --develop develop --production master
  release_flow plan api --version 1.4.0
  release_flow release api --version 1.4.0"
)]
pub struct Args {
    /// Configuration file
    #[arg(long, global = true, env = "RELEASE_FLOW_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the release workflow for a repository
    Release {
        /// Configured repository name
        repo: String,

        /// Version to release (prompted for when omitted)
        #[arg(short = 't', long = "version", value_name = "VERSION")]
        version_tag: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the refs a release would create
    Plan {
        /// Configured repository name
        repo: String,

        /// Version to plan
        #[arg(short = 't', long = "version", value_name = "VERSION")]
        version_tag: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the refs of a previous release attempt
    Rollback {
        /// Configured repository name
        repo: String,

        /// Version whose refs are deleted
        #[arg(short = 't', long = "version", value_name = "VERSION")]
        version_tag: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show branch and merge state of a repository
    Status {
        /// Configured repository name
        repo: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured repositories
    List,

    /// Add a repository to the configuration
    Add {
        /// Name used on the command line
        name: String,

        /// Working directory
        path: PathBuf,

        /// Remote URL, informational
        #[arg(long)]
        remote_url: Option<String>,

        /// Develop branch (defaults from configuration)
        #[arg(long)]
        develop: Option<String>,

        /// Production branch (defaults from configuration)
        #[arg(long)]
        production: Option<String>,

        /// Workflow kind: standard or legacy
        #[arg(long)]
        kind: Option<WorkflowKind>,
    },
}

impl Command {
    /// Name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Release { .. } => "release",
            Command::Plan { .. } => "plan",
            Command::Rollback { .. } => "rollback",
            Command::Status { .. } => "status",
            Command::List => "list",
            Command::Add { .. } => "add",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        match &self.command {
            Command::Release { repo, .. }
            | Command::Plan { repo, .. }
            | Command::Rollback { repo, .. }
            | Command::Status { repo, .. }
                if repo.trim().is_empty() =>
            {
                Err("Repository name is required".to_string())
            }
            Command::Add { name, .. } if name.trim().is_empty() => {
                Err("Repository name is required".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
    /// Configuration file in use
    pub config_path: PathBuf,
}

impl RuntimeConfig {
    /// Runtime configuration for `args`, resolving the default config path
    pub fn from_args(args: &Args) -> Result<Self> {
        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => ConfigStore::default_path()?,
        };
        Ok(Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
            config_path,
        })
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Load the configuration file
    pub fn load_store(&self) -> Result<ConfigStore> {
        self.verbose_println(&format!(
            "Using configuration {}",
            self.config_path.display()
        ));
        ConfigStore::load(&self.config_path)
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print info message
    pub fn info_println(&self, message: &str) {
        let _ = self.output.info(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Print multi-line text, one line at a time
    pub fn print_block(&self, text: &str) {
        for line in text.lines() {
            self.println(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_release_with_global_flags() {
        let args = Args::try_parse_from([
            "release_flow",
            "release",
            "api",
            "--version",
            "1.0.0",
            "-y",
            "--config",
            "/tmp/c.yaml",
            "-v",
        ])
        .unwrap();
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.yaml")));
        match args.command {
            Command::Release {
                repo,
                version_tag,
                yes,
            } => {
                assert_eq!(repo, "api");
                assert_eq!(version_tag.as_deref(), Some("1.0.0"));
                assert!(yes);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn add_accepts_kind_alias() {
        let args = Args::try_parse_from([
            "release_flow",
            "add",
            "api",
            "/srv/api",
            "--kind",
            "custom",
        ])
        .unwrap();
        match args.command {
            Command::Add { kind, .. } => assert_eq!(kind, Some(WorkflowKind::Legacy)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn empty_repo_is_rejected() {
        let args = Args::try_parse_from(["release_flow", "status", ""]).unwrap();
        assert!(args.validate().is_err());
    }
}
