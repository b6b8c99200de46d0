//! Release command implementation.
//!
//! Resolves the repository and version, confirms the plan with the operator
//! and drives the workflow, prompting at merge conflicts.

use super::print_suggestions;
use crate::cli::{Args, Command, RuntimeConfig, TerminalPrompt};
use crate::error::{ReleaseError, Result};
use crate::git::{GitCli, GitOperations};
use crate::notify::{CommandNotifier, LogNotifier, ReleaseNotifier};
use crate::workflow::{OperatorPrompt, ReleaseRequest, ReleaseWorkflow};

/// Execute release command
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Release {
        repo,
        version_tag,
        yes,
    } = &args.command
    else {
        return Err(ReleaseError::InvalidState {
            reason: "execute_release called with another command".to_string(),
        });
    };

    // Everything the operator can get wrong is checked before git runs
    let store = config.load_store()?;
    let descriptor = store.get_repository(repo)?.clone();
    let mut prompt = TerminalPrompt::new(config.output().clone());

    let version = match version_tag {
        Some(version) => version.clone(),
        None => prompt.version(store.default_tag()).await?,
    };
    let request = ReleaseRequest::new(descriptor, version)?;

    config.println(&format!(
        "📦 Releasing {} at {}",
        request.repository().name,
        request.version_tag()
    ));
    config.print_block(&request.artifact_names().format_plan());

    let git = GitCli::with_config(&request.repository().path, store.git_config().clone()).await?;
    config.verbose_println(&format!("✓ Repository: {}", git.work_dir().display()));

    if !git.status_porcelain().await?.is_empty() {
        config.warning_println("Working directory has uncommitted changes");
        config.warning_println("   Checkouts during the release may fail or carry them along");
    }

    if !yes && !prompt.confirm("Proceed with release?").await? {
        config.println("Release cancelled");
        return Ok(0);
    }

    let mut workflow = ReleaseWorkflow::for_request(git, request);
    config.verbose_println(&format!("Run id: {}", workflow.run_id()));

    match workflow.run(&mut prompt).await {
        Ok(result) => {
            config.print_block(&result.format_result());

            LogNotifier.notify(&result).await;
            let commands = store.notify_commands();
            if !commands.is_empty() {
                config.verbose_println(&format!("Running {} notify command(s)", commands.len()));
                CommandNotifier::new(commands.to_vec()).notify(&result).await;
            }
            Ok(0)
        }
        Err(failure) => {
            config.error_println(&format!("Release failed: {}", failure.error));
            config.print_block(&failure.result.format_result());
            match &failure.rollback {
                Some(report) => config.print_block(&report.format_result()),
                None => config.warning_println("No rollback was performed"),
            }
            print_suggestions(config, &failure.error);
            Ok(1)
        }
    }
}
