//! Post-release notification.
//!
//! Notifiers run only after a successful release. Their failures are logged
//! and never change the release outcome.

use crate::workflow::ReleaseResult;
use anyhow::Context;
use std::future::Future;
use tokio::process::Command;

/// Something to tell once a release has completed
pub trait ReleaseNotifier {
    /// Announce `result`
    fn notify(&self, result: &ReleaseResult) -> impl Future<Output = ()>;
}

/// Writes one log line per release
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ReleaseNotifier for LogNotifier {
    async fn notify(&self, result: &ReleaseResult) {
        log::info!(
            "Released {}: version tag {}, final branch {}",
            result.repository,
            result.version_tag.as_deref().unwrap_or("-"),
            result.final_release_branch.as_deref().unwrap_or("-")
        );
    }
}

/// Runs configured shell commands with the release names in the environment
#[derive(Debug, Clone, Default)]
pub struct CommandNotifier {
    commands: Vec<String>,
}

impl CommandNotifier {
    /// Notifier running each entry of `commands` through `sh -c`
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }

    /// Environment passed to every command
    pub fn environment(result: &ReleaseResult) -> Vec<(&'static str, String)> {
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            ("RELEASE_FLOW_REPOSITORY", result.repository.clone()),
            ("RELEASE_FLOW_VERSION_TAG", value(&result.version_tag)),
            ("RELEASE_FLOW_RELEASE_BRANCH", value(&result.release_branch)),
            ("RELEASE_FLOW_FINAL_BRANCH", value(&result.final_release_branch)),
            ("RELEASE_FLOW_ROLLBACK_TAG", value(&result.rollback_tag)),
        ]
    }
}

impl CommandNotifier {
    async fn run_one(command: &str, env: &[(&'static str, String)]) -> anyhow::Result<()> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .context("failed to spawn sh")?;

        if !output.status.success() {
            anyhow::bail!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

impl ReleaseNotifier for CommandNotifier {
    async fn notify(&self, result: &ReleaseResult) {
        let env = Self::environment(result);
        for command in &self.commands {
            log::debug!("Running notify command: {}", command);
            match Self::run_one(command, &env).await {
                Ok(()) => log::info!("Notify command succeeded: {}", command),
                Err(e) => log::warn!("Notify command '{}' failed: {:#}", command, e),
            }
        }
    }
}
