//! Operator interaction seam.

use crate::error::Result;
use crate::workflow::ConflictReport;
use std::future::Future;

/// Operator's answer at a conflict suspension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDecision {
    /// The merge was resolved and committed; continue the release
    Continue,
    /// Abort the merge and roll back
    Abort,
}

/// Source of operator input for [`ReleaseWorkflow::run`](crate::workflow::ReleaseWorkflow::run)
pub trait OperatorPrompt {
    /// Ask for the version to release, offering `default` if present
    fn version(&mut self, default: Option<&str>) -> impl Future<Output = Result<String>>;

    /// Show a conflict and ask whether to continue or abort.
    ///
    /// `unresolved_attempt` is true when the previous continue found the
    /// merge still unresolved.
    fn resolve_conflict(
        &mut self,
        report: &ConflictReport,
        unresolved_attempt: bool,
    ) -> impl Future<Output = Result<ResumeDecision>>;
}
