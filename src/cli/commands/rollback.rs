//! Rollback command implementation.
//!
//! Deletes whatever refs currently exist for a release version, locally and
//! on the remote.

use crate::cli::{Args, Command, RuntimeConfig, TerminalPrompt};
use crate::error::{CliError, ReleaseError, Result};
use crate::git::{GitCli, GitOperations};
use crate::state::{Artifact, WorkdirLease};
use crate::workflow::{ReleaseRequest, RollbackManager};

/// Execute rollback command
pub(super) async fn execute_rollback(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Rollback {
        repo,
        version_tag,
        yes,
    } = &args.command
    else {
        return Err(ReleaseError::InvalidState {
            reason: "execute_rollback called with another command".to_string(),
        });
    };

    let store = config.load_store()?;
    let descriptor = store.get_repository(repo)?.clone();
    let request = ReleaseRequest::new(descriptor, version_tag.as_str())?;

    let git = GitCli::with_config(&request.repository().path, store.git_config().clone()).await?;
    let run_id = format!("rollback-{}", uuid::Uuid::new_v4());
    let _lease = WorkdirLease::acquire(&git.git_dir().await?, &run_id)?;

    config.verbose_println("Looking for existing release refs...");
    let artifacts = RollbackManager::discover(&git, request.artifact_names()).await;

    if artifacts.is_empty() {
        config.println(&format!(
            "Nothing to roll back for {} {}",
            request.repository().name,
            request.version_tag()
        ));
        return Ok(());
    }

    config.section(&format!(
        "Rollback of {} {}",
        request.repository().name,
        request.version_tag()
    ));
    for artifact in Artifact::CREATION_ORDER {
        if let Some(name) = artifacts.name(artifact) {
            let state = artifacts.state(artifact);
            let scope = match (state.is_local(), state.is_remote()) {
                (true, true) => "local + remote",
                (false, true) => "remote",
                _ => "local",
            };
            config.indent(&format!("{}: {} ({})", artifact, name, scope));
        }
    }

    if !yes {
        let mut prompt = TerminalPrompt::new(config.output().clone());
        if !prompt.confirm("Delete these refs?").await? {
            config.println("Rollback cancelled");
            return Ok(());
        }
    }

    let manager = RollbackManager::new(request.repository().branches.develop.clone());
    let report = manager.rollback(&git, &artifacts).await;
    config.print_block(&report.format_result());

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::ExecutionFailed {
            command: "rollback".to_string(),
            reason: format!("{} deletion(s) failed", report.total().failed),
        }
        .into())
    }
}
