//! Comprehensive error types for release_flow operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release_flow operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release_flow operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Git operation errors (any primitive failure not related to conflicts)
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Resume was requested while the merge still has unresolved conflicts
    #[error(
        "Merge conflicts are still unresolved ({} path(s): {}). Resolve, commit, then continue.",
        .paths.len(),
        .paths.join(", ")
    )]
    ConflictUnresolved {
        /// Paths still reported as unmerged
        paths: Vec<String>,
    },

    /// The conflicted merge was abandoned instead of committed
    #[error(
        "'{source_branch}' is not merged into '{target_branch}'; the merge was abandoned. Merge it again and commit, or abort."
    )]
    MergeNotConcluded {
        /// Branch that was being merged in
        source_branch: String,
        /// Branch receiving the merge
        target_branch: String,
    },

    /// The operator aborted the release while resolving a merge conflict
    #[error("Release aborted by operator while merging '{source_branch}' into '{target_branch}'")]
    MergeAborted {
        /// Branch that was being merged in
        source_branch: String,
        /// Branch receiving the merge
        target_branch: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Working directory lease errors
    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    /// An operation was requested in a state that does not allow it
    #[error("Invalid workflow state: {reason}")]
    InvalidState {
        /// Reason for the error
        reason: String,
    },

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository: {path}")]
    NotRepository {
        /// Path that was expected to be a working directory
        path: PathBuf,
    },

    /// The git executable could not be located
    #[error("Could not find the git executable on PATH: {reason}")]
    GitNotFound {
        /// Reason for the error
        reason: String,
    },

    /// A git command exited unsuccessfully
    #[error("git {operation} failed: {reason}")]
    CommandFailed {
        /// Operation that failed
        operation: String,
        /// Reason for the error (usually git's stderr)
        reason: String,
    },

    /// Tag already exists
    #[error("Git tag '{tag}' already exists. Choose a different version or roll back the previous run.")]
    TagExists {
        /// Tag name
        tag: String,
    },

    /// Branch already exists
    #[error("Git branch '{branch}' already exists. Choose a different version or roll back the previous run.")]
    BranchExists {
        /// Branch name
        branch: String,
    },

    /// Reference could not be resolved
    #[error("Git reference '{name}' not found")]
    RefNotFound {
        /// Reference name
        name: String,
    },

    /// Push was rejected by the remote
    #[error("Push of '{refname}' was rejected: {reason}")]
    PushRejected {
        /// Ref that was pushed
        refname: String,
        /// Reason for the error
        reason: String,
    },

    /// Refusing to fetch into the branch that is checked out
    #[error("Refusing to fetch into '{branch}' while it is checked out")]
    CheckedOutBranch {
        /// Branch name
        branch: String,
    },
}

/// Configuration errors, raised before any git operation starts
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be parsed
    #[error("Malformed configuration file {path}: {reason}")]
    Malformed {
        /// Path to the configuration file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Repository name not present in configuration
    #[error("Repository '{name}' is not configured")]
    UnknownRepository {
        /// Repository name
        name: String,
    },

    /// Repository name already present in configuration
    #[error("Repository '{name}' is already configured")]
    DuplicateRepository {
        /// Repository name
        name: String,
    },

    /// Repository descriptor failed validation
    #[error("Invalid repository descriptor '{name}': {reason}")]
    InvalidRepository {
        /// Repository name
        name: String,
        /// Reason for the error
        reason: String,
    },

    /// Requested version cannot be used in ref names
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {reason}")]
    SaveFailed {
        /// Path to the configuration file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Working directory lease errors
#[derive(Error, Debug)]
pub enum LockError {
    /// Another run holds the lease
    #[error("Another release is already running against this repository (lock {path}, holder: {holder})")]
    Held {
        /// Path to the lock file
        path: PathBuf,
        /// Description of the current holder, if readable
        holder: String,
    },

    /// Failed to create or write the lock file
    #[error("Failed to acquire lock {path}: {reason}")]
    AcquireFailed {
        /// Path to the lock file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Operator input could not be read
    #[error("Failed to read operator input: {reason}")]
    InputFailed {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Git(GitError::TagExists { tag }) => vec![
                format!("Inspect the existing tag: git show {}", tag),
                "Roll back a previous attempt: release_flow rollback <repo> --version <version>"
                    .to_string(),
                "Release under a different version".to_string(),
            ],
            ReleaseError::Git(GitError::BranchExists { branch }) => vec![
                format!("Inspect the existing branch: git log -1 {}", branch),
                "Roll back a previous attempt: release_flow rollback <repo> --version <version>"
                    .to_string(),
            ],
            ReleaseError::Git(GitError::PushRejected { .. }) => vec![
                "Fetch and inspect the remote branch: git fetch origin".to_string(),
                "Reconcile the divergence manually, then re-run the release".to_string(),
            ],
            ReleaseError::Git(GitError::GitNotFound { .. }) => vec![
                "Install git and make sure it is on PATH".to_string(),
            ],
            ReleaseError::ConflictUnresolved { .. } => vec![
                "Resolve the conflicted files and stage them: git add <path>".to_string(),
                "Conclude the merge: git commit --no-edit".to_string(),
                "Check progress: git status".to_string(),
            ],
            ReleaseError::MergeNotConcluded { source_branch, .. } => vec![
                format!("Redo the merge: git merge {}", source_branch),
                "Resolve any conflicts and commit, then continue".to_string(),
            ],
            ReleaseError::Lock(LockError::Held { path, .. }) => vec![
                "Wait for the running release to finish or abort it".to_string(),
                format!("The holder's pid and run id are recorded in {}", path.display()),
            ],
            ReleaseError::Config(ConfigError::UnknownRepository { .. }) => vec![
                "List configured repositories: release_flow list".to_string(),
                "Add the repository: release_flow add <name> <path>".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether the run is still paused on the merge and can be resumed
    pub fn awaits_merge(&self) -> bool {
        matches!(
            self,
            ReleaseError::ConflictUnresolved { .. } | ReleaseError::MergeNotConcluded { .. }
        )
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ReleaseError::Git(GitError::NotRepository { .. })
                | ReleaseError::Git(GitError::GitNotFound { .. })
                | ReleaseError::Config(ConfigError::Malformed { .. })
                | ReleaseError::Config(ConfigError::InvalidVersion { .. })
                | ReleaseError::InvalidState { .. }
        )
    }
}
