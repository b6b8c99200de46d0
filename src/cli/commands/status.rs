//! Status command implementation.
//!
//! Displays branch and merge state of a configured repository.

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{ReleaseError, Result};
use crate::git::{GitCli, GitOperations, status};
use crate::state::{LeaseInfo, WorkdirLease};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RepositoryStatus {
    repository: String,
    current_branch: Option<String>,
    merge_in_progress: bool,
    conflicted_paths: Vec<String>,
    release_running: Option<LeaseInfo>,
}

/// Execute status command
pub(super) async fn execute_status(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Status { repo, json } = &args.command else {
        return Err(ReleaseError::InvalidState {
            reason: "execute_status called with another command".to_string(),
        });
    };

    let store = config.load_store()?;
    let descriptor = store.get_repository(repo)?;
    let git = GitCli::with_config(&descriptor.path, store.git_config().clone()).await?;

    let release_running = WorkdirLease::holder(&git.git_dir().await?);

    let report = RepositoryStatus {
        repository: descriptor.name.clone(),
        current_branch: git.current_branch().await?,
        merge_in_progress: git.is_merge_in_progress().await?,
        conflicted_paths: status::unmerged_paths(&git.status_porcelain().await?),
        release_running,
    };

    if *json {
        let json_output = serde_json::to_string_pretty(&report).map_err(ReleaseError::Json)?;
        println!("{}", json_output);
        return Ok(());
    }

    config.section(&format!("Status of {}", report.repository));
    config.println(&format!(
        "🌿 Branch: {}",
        report.current_branch.as_deref().unwrap_or("(detached HEAD)")
    ));
    if report.merge_in_progress {
        config.warning_println("Merge in progress");
    } else {
        config.println("✅ No merge in progress");
    }
    if !report.conflicted_paths.is_empty() {
        config.println(&format!(
            "❌ {} conflicted path(s):",
            report.conflicted_paths.len()
        ));
        for path in &report.conflicted_paths {
            config.indent(path);
        }
    }
    if let Some(info) = &report.release_running {
        config.println(&format!(
            "🔒 Release running: pid {} run {} since {}",
            info.pid,
            info.run_id,
            info.acquired_at.to_rfc3339()
        ));
    }
    Ok(())
}
