//! Result types for release runs.

use crate::error::ReleaseError;
use crate::state::{Artifact, WorkflowArtifacts};
use crate::workflow::{ConflictReport, RollbackReport};
use serde::Serialize;

/// Outcome of a release run
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseResult {
    /// Whether the release completed
    pub success: bool,
    /// Repository name
    pub repository: String,
    /// Rollback tag, if created
    pub rollback_tag: Option<String>,
    /// Release branch, if created
    pub release_branch: Option<String>,
    /// Version tag, if created
    pub version_tag: Option<String>,
    /// Final release branch, if created
    pub final_release_branch: Option<String>,
    /// Error message on failure
    pub error_message: Option<String>,
    /// Duration of the operation
    #[serde(skip)]
    pub duration: std::time::Duration,
}

impl ReleaseResult {
    /// Successful result naming every created artifact
    pub fn succeeded(
        repository: &str,
        artifacts: &WorkflowArtifacts,
        duration: std::time::Duration,
    ) -> Self {
        Self::from_artifacts(repository, artifacts, true, None, duration)
    }

    /// Failed result naming whatever was created before `error`
    pub fn failed(
        repository: &str,
        artifacts: &WorkflowArtifacts,
        error: &ReleaseError,
        duration: std::time::Duration,
    ) -> Self {
        Self::from_artifacts(
            repository,
            artifacts,
            false,
            Some(error.to_string()),
            duration,
        )
    }

    fn from_artifacts(
        repository: &str,
        artifacts: &WorkflowArtifacts,
        success: bool,
        error_message: Option<String>,
        duration: std::time::Duration,
    ) -> Self {
        let name = |artifact| artifacts.name(artifact).map(str::to_string);
        Self {
            success,
            repository: repository.to_string(),
            rollback_tag: name(Artifact::RollbackTag),
            release_branch: name(Artifact::ReleaseBranch),
            version_tag: name(Artifact::VersionTag),
            final_release_branch: name(Artifact::FinalBranch),
            error_message,
            duration,
        }
    }

    /// Format result for display
    pub fn format_result(&self) -> String {
        let mut result = if self.success {
            format!("🎉 Release of {} completed successfully!\n", self.repository)
        } else {
            format!("❌ Release of {} failed\n", self.repository)
        };

        if let Some(ref tag) = self.rollback_tag {
            result.push_str(&format!("🔖 Rollback tag: {}\n", tag));
        }
        if let Some(ref branch) = self.release_branch {
            result.push_str(&format!("🌿 Release Branch: {}\n", branch));
        }
        if let Some(ref tag) = self.version_tag {
            result.push_str(&format!("🏷️  Version tag: {}\n", tag));
        }
        if let Some(ref branch) = self.final_release_branch {
            result.push_str(&format!("🚀 Final release branch: {}\n", branch));
        }
        if let Some(ref message) = self.error_message {
            result.push_str(&format!("💥 Error: {}\n", message));
        }

        result.push_str(&format!(
            "⏱️  Duration: {:.2}s\n",
            self.duration.as_secs_f64()
        ));

        result
    }
}

/// Where a run stands after `start` or `resume`
#[derive(Debug, Clone)]
pub enum WorkflowStatus {
    /// All nine steps finished
    Completed(ReleaseResult),
    /// Waiting for the operator to resolve a merge conflict
    Suspended(ConflictReport),
}

/// A run that did not complete.
///
/// Carries the error, the partial result and, for terminal failures, the
/// rollback that was performed.
#[derive(Debug)]
pub struct ReleaseFailure {
    /// What went wrong
    pub error: ReleaseError,
    /// Partial result with `success == false`
    pub result: ReleaseResult,
    /// Rollback performed, `None` while the run is still resumable
    pub rollback: Option<RollbackReport>,
}

impl ReleaseFailure {
    /// Whether the run is still suspended and `resume` may be called again
    pub fn is_resumable(&self) -> bool {
        self.error.awaits_merge() && self.rollback.is_none()
    }
}

impl std::fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "release of {} failed: {}", self.result.repository, self.error)
    }
}

impl std::error::Error for ReleaseFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
