//! Merge conflict detection and the operator pause.
//!
//! The coordinator never resolves anything itself. It records which paths
//! are unmerged, hands control back to the caller, and on resume checks the
//! repository again before letting the workflow continue.

use crate::error::{ReleaseError, Result};
use crate::git::{GitOperations, status};
use serde::Serialize;

/// Conflict handling state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictState {
    /// No conflict seen
    #[default]
    Clean,
    /// Merge stopped with unmerged paths
    Detected,
    /// Waiting for the operator
    Suspended,
    /// Operator resolved and committed the merge
    Resolved,
    /// Operator aborted the merge
    Aborted,
}

/// What the operator is shown at the suspension point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Paths git reports as unmerged
    pub conflicted_paths: Vec<String>,
    /// Whether MERGE_HEAD is present
    pub merge_in_progress: bool,
    /// Branch being merged in
    pub source_branch: String,
    /// Branch receiving the merge
    pub target_branch: String,
}

impl ConflictReport {
    /// Format report for display
    pub fn format_report(&self) -> String {
        let mut result = format!(
            "⚠️  Merge of '{}' into '{}' stopped with conflicts\n",
            self.source_branch, self.target_branch
        );
        if self.conflicted_paths.is_empty() {
            result.push_str("  (no unmerged paths; the merge still needs to be committed)\n");
        }
        for path in &self.conflicted_paths {
            result.push_str(&format!("  - {}\n", path));
        }
        result
    }
}

/// Tracks one merge through detection, suspension and resolution
#[derive(Debug, Default)]
pub struct ConflictCoordinator {
    state: ConflictState,
    report: Option<ConflictReport>,
}

impl ConflictCoordinator {
    /// Coordinator in the `Clean` state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> ConflictState {
        self.state
    }

    /// Report from the last detection, if any
    pub fn report(&self) -> Option<&ConflictReport> {
        self.report.as_ref()
    }

    /// Record a conflicted merge of `source_branch` into `target_branch`
    pub async fn detect<G: GitOperations>(
        &mut self,
        git: &G,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<ConflictReport> {
        self.require_state(&[ConflictState::Clean, ConflictState::Resolved], "detect")?;

        let report = ConflictReport {
            conflicted_paths: status::unmerged_paths(&git.status_porcelain().await?),
            merge_in_progress: git.is_merge_in_progress().await?,
            source_branch: source_branch.to_string(),
            target_branch: target_branch.to_string(),
        };
        log::warn!(
            "Merge of {} into {} conflicted on {} path(s)",
            source_branch,
            target_branch,
            report.conflicted_paths.len()
        );

        self.state = ConflictState::Detected;
        self.report = Some(report.clone());
        Ok(report)
    }

    /// Pause for the operator
    pub fn suspend(&mut self) -> Result<ConflictReport> {
        self.require_state(&[ConflictState::Detected], "suspend")?;
        self.state = ConflictState::Suspended;
        self.current_report("suspend")
    }

    /// Check whether the operator finished the merge.
    ///
    /// Leaves the coordinator suspended with a fresh report and returns
    /// [`ReleaseError::ConflictUnresolved`] if the merge marker is still
    /// present or any path is still unmerged. A merge that was abandoned
    /// rather than committed leaves the source branch unmerged and returns
    /// [`ReleaseError::MergeNotConcluded`], also still suspended.
    pub async fn resume<G: GitOperations>(&mut self, git: &G) -> Result<()> {
        self.require_state(&[ConflictState::Suspended], "resume")?;
        let previous = self.current_report("resume")?;

        let merge_in_progress = git.is_merge_in_progress().await?;
        let conflicted_paths = status::unmerged_paths(&git.status_porcelain().await?);

        if !merge_in_progress && conflicted_paths.is_empty() {
            if !git.is_ancestor(&previous.source_branch, "HEAD").await? {
                log::warn!(
                    "{} is not merged into {}; staying suspended",
                    previous.source_branch,
                    previous.target_branch
                );
                self.report = Some(ConflictReport {
                    conflicted_paths: Vec::new(),
                    merge_in_progress: false,
                    ..previous.clone()
                });
                return Err(ReleaseError::MergeNotConcluded {
                    source_branch: previous.source_branch,
                    target_branch: previous.target_branch,
                });
            }
            log::info!("Merge conflict resolved");
            self.state = ConflictState::Resolved;
            return Ok(());
        }

        let report = ConflictReport {
            conflicted_paths: conflicted_paths.clone(),
            merge_in_progress,
            ..previous
        };
        self.report = Some(report);
        self.state = ConflictState::Detected;
        self.suspend()?;

        Err(ReleaseError::ConflictUnresolved {
            paths: conflicted_paths,
        })
    }

    /// Abort the merge. Always returns [`ReleaseError::MergeAborted`] once
    /// the merge has been aborted.
    pub async fn abort<G: GitOperations>(&mut self, git: &G) -> Result<()> {
        self.require_state(&[ConflictState::Suspended], "abort")?;
        let report = self.current_report("abort")?;

        // The operator may already have run `git merge --abort`
        if git.is_merge_in_progress().await? {
            git.abort_merge().await?;
        }
        self.state = ConflictState::Aborted;
        log::warn!(
            "Merge of {} into {} aborted by operator",
            report.source_branch,
            report.target_branch
        );

        Err(ReleaseError::MergeAborted {
            source_branch: report.source_branch,
            target_branch: report.target_branch,
        })
    }

    fn require_state(&self, allowed: &[ConflictState], operation: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ReleaseError::InvalidState {
                reason: format!(
                    "cannot {} a merge conflict in state {:?}",
                    operation, self.state
                ),
            })
        }
    }

    fn current_report(&self, operation: &str) -> Result<ConflictReport> {
        self.report.clone().ok_or_else(|| ReleaseError::InvalidState {
            reason: format!("cannot {} without a conflict report", operation),
        })
    }
}
