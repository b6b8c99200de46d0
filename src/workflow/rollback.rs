//! Reversal of the refs a release run created.

use crate::git::GitOperations;
use crate::state::{Artifact, WorkflowArtifacts};
use crate::workflow::ArtifactNames;
use serde::Serialize;
use std::fmt;

/// Where a deletion happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RollbackScope {
    /// The remote repository
    Remote,
    /// The local repository
    Local,
}

impl fmt::Display for RollbackScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollbackScope::Remote => f.write_str("remote"),
            RollbackScope::Local => f.write_str("local"),
        }
    }
}

/// Outcome of one deletion attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RollbackOutcome {
    /// Ref was deleted
    Deleted,
    /// Deletion failed with the given reason
    Failed(String),
}

/// One deletion attempt
#[derive(Debug, Clone, Serialize)]
pub struct RollbackEntry {
    /// Artifact being removed
    pub artifact: Artifact,
    /// Remote or local
    pub scope: RollbackScope,
    /// Ref name
    pub name: String,
    /// What happened
    pub outcome: RollbackOutcome,
}

/// Per-kind deletion counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RollbackTally {
    /// Deletions attempted
    pub attempted: usize,
    /// Deletions that succeeded
    pub succeeded: usize,
    /// Deletions that failed
    pub failed: usize,
}

/// Result of a rollback
#[derive(Debug, Clone, Default, Serialize)]
pub struct RollbackReport {
    /// Deletion attempts in the order they ran
    pub entries: Vec<RollbackEntry>,
    /// Problems that did not correspond to a deletion
    pub warnings: Vec<String>,
    /// Duration of the rollback
    #[serde(skip)]
    pub duration: std::time::Duration,
}

impl RollbackReport {
    /// Whether every deletion succeeded and nothing else went wrong
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
            && self
                .entries
                .iter()
                .all(|e| e.outcome == RollbackOutcome::Deleted)
    }

    /// Whether nothing had to be deleted
    pub fn is_noop(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts for one artifact kind
    pub fn tally(&self, artifact: Artifact) -> RollbackTally {
        self.entries
            .iter()
            .filter(|e| e.artifact == artifact)
            .fold(RollbackTally::default(), |mut tally, e| {
                tally.attempted += 1;
                match e.outcome {
                    RollbackOutcome::Deleted => tally.succeeded += 1,
                    RollbackOutcome::Failed(_) => tally.failed += 1,
                }
                tally
            })
    }

    /// Counts across all artifacts
    pub fn total(&self) -> RollbackTally {
        Artifact::CREATION_ORDER
            .iter()
            .map(|a| self.tally(*a))
            .fold(RollbackTally::default(), |acc, t| RollbackTally {
                attempted: acc.attempted + t.attempted,
                succeeded: acc.succeeded + t.succeeded,
                failed: acc.failed + t.failed,
            })
    }

    /// Format rollback report for display
    pub fn format_result(&self) -> String {
        let status = if self.is_clean() { "✅" } else { "⚠️" };
        let mut result = format!("{} Rollback completed\n", status);

        if self.is_noop() {
            result.push_str("🔄 Nothing to roll back\n");
        } else {
            result.push_str("🔄 Operations rolled back:\n");
            for entry in &self.entries {
                match &entry.outcome {
                    RollbackOutcome::Deleted => result.push_str(&format!(
                        "  - Deleted {} {} {}\n",
                        entry.scope, entry.artifact, entry.name
                    )),
                    RollbackOutcome::Failed(reason) => result.push_str(&format!(
                        "  - FAILED to delete {} {} {}: {}\n",
                        entry.scope, entry.artifact, entry.name, reason
                    )),
                }
            }
        }

        if !self.warnings.is_empty() {
            result.push_str("⚠️  Warnings:\n");
            for warning in &self.warnings {
                result.push_str(&format!("  - {}\n", warning));
            }
        }

        let total = self.total();
        result.push_str(&format!(
            "📊 {} attempted, {} succeeded, {} failed\n",
            total.attempted, total.succeeded, total.failed
        ));
        result.push_str(&format!(
            "⏱️  Duration: {:.2}s\n",
            self.duration.as_secs_f64()
        ));

        result
    }
}

/// Deletes created refs in reverse creation order
#[derive(Debug, Clone)]
pub struct RollbackManager {
    safe_branch: String,
}

impl RollbackManager {
    /// Manager that parks the working tree on `safe_branch` before deleting
    /// local branches
    pub fn new(safe_branch: impl Into<String>) -> Self {
        Self {
            safe_branch: safe_branch.into(),
        }
    }

    /// Branch checked out before local deletions
    pub fn safe_branch(&self) -> &str {
        &self.safe_branch
    }

    /// Reverse everything recorded in `artifacts`.
    ///
    /// Each deletion is attempted independently; failures are logged and
    /// recorded in the report, never returned.
    pub async fn rollback<G: GitOperations>(
        &self,
        git: &G,
        artifacts: &WorkflowArtifacts,
    ) -> RollbackReport {
        let start_time = std::time::Instant::now();
        let mut report = RollbackReport::default();

        if artifacts.is_empty() {
            log::info!("Nothing to roll back");
            report.duration = start_time.elapsed();
            return report;
        }

        log::info!("Rolling back release artifacts");

        match git.is_merge_in_progress().await {
            Ok(true) => {
                if let Err(e) = git.abort_merge().await {
                    log::warn!("Failed to abort in-progress merge: {}", e);
                    report
                        .warnings
                        .push(format!("Failed to abort in-progress merge: {}", e));
                }
            }
            Ok(false) => {}
            Err(e) => report
                .warnings
                .push(format!("Could not check merge state: {}", e)),
        }

        // Local branches cannot be deleted while checked out
        let needs_checkout = match git.current_branch().await {
            Ok(current) => current.as_deref() != Some(self.safe_branch.as_str()),
            Err(_) => true,
        };
        if needs_checkout && let Err(e) = git.checkout(&self.safe_branch).await {
            log::warn!("Failed to checkout {}: {}", self.safe_branch, e);
            report
                .warnings
                .push(format!("Failed to checkout {}: {}", self.safe_branch, e));
        }

        for (artifact, name, state) in artifacts.created_in_reverse() {
            if state.is_remote() {
                let result = if artifact.is_tag() {
                    git.delete_remote_tag(&name).await
                } else {
                    git.delete_remote_branch(&name).await
                };
                Self::record(&mut report, artifact, RollbackScope::Remote, &name, result);
            }

            if state.is_local() {
                let result = if artifact.is_tag() {
                    git.delete_tag(&name).await
                } else {
                    git.delete_branch(&name).await
                };
                Self::record(&mut report, artifact, RollbackScope::Local, &name, result);
            }
        }

        report.duration = start_time.elapsed();
        report
    }

    /// Rebuild an artifact record from the refs that currently exist for
    /// `names`. Lookup failures are treated as absent.
    pub async fn discover<G: GitOperations>(git: &G, names: &ArtifactNames) -> WorkflowArtifacts {
        let mut artifacts = WorkflowArtifacts::new();
        let candidates = [
            (Artifact::RollbackTag, names.rollback_tag.as_str()),
            (Artifact::ReleaseBranch, names.release_branch.as_str()),
            (Artifact::VersionTag, names.version_tag.as_str()),
            (Artifact::FinalBranch, names.final_release_branch.as_str()),
        ];

        for (artifact, name) in candidates {
            let (local, remote) = if artifact.is_tag() {
                (git.tag_exists(name).await, git.remote_tag_exists(name).await)
            } else {
                (
                    git.branch_exists(name).await,
                    git.remote_branch_exists(name).await,
                )
            };
            let local = local.unwrap_or(false);
            let remote = remote.unwrap_or(false);

            match (local, remote) {
                (true, true) => {
                    artifacts.mark_created(artifact, name);
                    artifacts.mark_pushed(artifact).ok();
                }
                (true, false) => artifacts.mark_created(artifact, name),
                (false, true) => artifacts.mark_remote_only(artifact, name),
                (false, false) => {}
            }
            log::debug!("{} {}: local={} remote={}", artifact, name, local, remote);
        }

        artifacts
    }

    fn record(
        report: &mut RollbackReport,
        artifact: Artifact,
        scope: RollbackScope,
        name: &str,
        result: crate::error::Result<()>,
    ) {
        let outcome = match result {
            Ok(()) => {
                log::info!("Deleted {} {} {}", scope, artifact, name);
                RollbackOutcome::Deleted
            }
            Err(e) => {
                log::warn!("Failed to delete {} {} {}: {}", scope, artifact, name, e);
                RollbackOutcome::Failed(e.to_string())
            }
        };
        report.entries.push(RollbackEntry {
            artifact,
            scope,
            name: name.to_string(),
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::FakeGit;

    fn names() -> ArtifactNames {
        ArtifactNames {
            rollback_tag: "rollback_develop_v1.0.0".to_string(),
            release_branch: "release_develop_1.0.0".to_string(),
            version_tag: "v_api_1.0.0".to_string(),
            final_release_branch: "release_master_1.0.0".to_string(),
        }
    }

    fn all_pushed() -> WorkflowArtifacts {
        let names = names();
        let mut artifacts = WorkflowArtifacts::new();
        artifacts.mark_created(Artifact::RollbackTag, &names.rollback_tag);
        artifacts.mark_created(Artifact::ReleaseBranch, &names.release_branch);
        artifacts.mark_created(Artifact::VersionTag, &names.version_tag);
        artifacts.mark_created(Artifact::FinalBranch, &names.final_release_branch);
        for artifact in Artifact::CREATION_ORDER {
            artifacts.mark_pushed(artifact).unwrap();
        }
        artifacts
    }

    /// Put every artifact ref into the fake, locally and/or on the remote
    fn seed(git: &FakeGit, local: bool, remote: bool) {
        let names = names();
        let mut state = git.state();
        for tag in [&names.rollback_tag, &names.version_tag] {
            if local {
                state.local_tags.insert(tag.clone());
            }
            if remote {
                state.remote_tags.insert(tag.clone());
            }
        }
        for branch in [&names.release_branch, &names.final_release_branch] {
            if local {
                state.local_branches.insert(branch.clone());
            }
            if remote {
                state.remote_branches.insert(branch.clone());
            }
        }
    }

    #[tokio::test]
    async fn one_attempt_per_artifact_and_scope() {
        let git = FakeGit::new("/tmp/repo/.git");
        seed(&git, true, true);
        git.state().current = Some("release_master_1.0.0".to_string());
        git.fail("delete_remote_tag:v_api_1.0.0", "remote hung up");

        let report = RollbackManager::new("develop")
            .rollback(&git, &all_pushed())
            .await;

        assert_eq!(report.entries.len(), 8);
        for artifact in Artifact::CREATION_ORDER {
            let tally = report.tally(artifact);
            assert_eq!(tally.attempted, 2, "{}", artifact);
        }
        assert_eq!(report.tally(Artifact::VersionTag).failed, 1);
        assert_eq!(report.total().failed, 1);
        assert!(!report.is_clean());

        // The failed remote tag deletion did not stop the local branch deletions
        assert_eq!(git.count_calls("delete_branch:"), 2);
        assert_eq!(git.state().current.as_deref(), Some("develop"));

        let order: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "release_master_1.0.0",
                "release_master_1.0.0",
                "v_api_1.0.0",
                "v_api_1.0.0",
                "release_develop_1.0.0",
                "release_develop_1.0.0",
                "rollback_develop_v1.0.0",
                "rollback_develop_v1.0.0",
            ]
        );
    }

    #[tokio::test]
    async fn empty_artifacts_are_a_noop() {
        let git = FakeGit::new("/tmp/repo/.git");
        let report = RollbackManager::new("develop")
            .rollback(&git, &WorkflowArtifacts::new())
            .await;
        assert!(report.is_noop());
        assert!(report.is_clean());
        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn aborts_merge_before_checkout() {
        let git = FakeGit::new("/tmp/repo/.git");
        git.state().merge_in_progress = true;
        git.state().current = Some("release_develop_1.0.0".to_string());
        git.state()
            .local_branches
            .insert("release_develop_1.0.0".to_string());

        let mut artifacts = WorkflowArtifacts::new();
        artifacts.mark_created(Artifact::ReleaseBranch, "release_develop_1.0.0");
        let report = RollbackManager::new("develop").rollback(&git, &artifacts).await;

        assert!(report.is_clean());
        let calls = git.calls();
        assert_eq!(calls[0], "abort_merge");
        assert_eq!(calls[1], "checkout:develop");
        assert_eq!(calls[2], "delete_branch:release_develop_1.0.0");
    }

    #[tokio::test]
    async fn discover_reflects_existing_refs() {
        let git = FakeGit::new("/tmp/repo/.git");
        {
            let mut state = git.state();
            state.local_tags.insert("rollback_develop_v1.0.0".to_string());
            state.remote_tags.insert("rollback_develop_v1.0.0".to_string());
            state.local_branches.insert("release_develop_1.0.0".to_string());
        }

        let artifacts = RollbackManager::discover(&git, &names()).await;
        assert!(artifacts.rollback_tag_pushed());
        assert!(artifacts.release_branch_created());
        assert!(!artifacts.release_branch_pushed());
        assert!(!artifacts.version_tag_created());
        assert!(!artifacts.final_branch_created());
    }

    #[tokio::test]
    async fn remote_only_refs_skip_local_deletion() {
        // A clone that never had the release refs locally
        let git = FakeGit::new("/tmp/repo/.git");
        seed(&git, false, true);

        let artifacts = RollbackManager::discover(&git, &names()).await;
        assert!(artifacts.final_branch_pushed());
        assert!(!artifacts.state(Artifact::FinalBranch).is_local());

        let report = RollbackManager::new("develop").rollback(&git, &artifacts).await;
        assert!(report.is_clean(), "{}", report.format_result());
        assert_eq!(report.total().attempted, 4);
        assert!(
            report
                .entries
                .iter()
                .all(|e| e.scope == RollbackScope::Remote)
        );
        assert_eq!(git.count_calls("delete_branch:"), 0);
        assert_eq!(git.count_calls("delete_tag:"), 0);

        let state = git.state();
        assert!(state.remote_tags.is_empty());
        assert!(!state.remote_branches.contains("release_master_1.0.0"));
    }

    #[tokio::test]
    async fn deleting_a_missing_local_ref_is_reported() {
        let git = FakeGit::new("/tmp/repo/.git");
        let mut artifacts = WorkflowArtifacts::new();
        artifacts.mark_created(Artifact::VersionTag, "v_api_1.0.0");

        let report = RollbackManager::new("develop").rollback(&git, &artifacts).await;
        assert_eq!(report.total().failed, 1);
        assert!(!report.is_clean());
    }
}
