//! Core Git operations trait and types for release workflows.
//!
//! This module defines the GitOperations trait that specifies every git
//! primitive the release workflow needs. The production implementation is
//! provided by the git_adapter module which drives the git executable.

use crate::error::Result;
use crate::git::StatusEntry;
use std::future::Future;
use std::path::PathBuf;

/// Trait defining all required Git operations for release workflows.
///
/// Every method operates on one bound working directory. Methods are async so
/// the adapter can await child processes, but the workflow never issues the
/// next call before the previous one completed.
pub trait GitOperations {
    /// Absolute path of the repository's git directory
    fn git_dir(&self) -> impl Future<Output = Result<PathBuf>>;

    /// Fetch from the remote and prune deleted remote refs
    fn fetch_prune(&self) -> impl Future<Output = Result<()>>;

    /// Fetch a named branch from the remote into the local namesake branch
    fn fetch_branch(&self, branch: &str) -> impl Future<Output = Result<()>>;

    /// Switch the working tree to a branch
    fn checkout(&self, branch: &str) -> impl Future<Output = Result<()>>;

    /// Fast-forward the current branch from its remote namesake
    fn pull(&self, branch: &str) -> impl Future<Output = Result<()>>;

    /// Create `new_branch` at `from_ref` and switch to it
    fn create_branch(&self, new_branch: &str, from_ref: &str)
    -> impl Future<Output = Result<()>>;

    /// Create a tag at HEAD
    fn tag(&self, name: &str) -> impl Future<Output = Result<()>>;

    /// Push a tag to the remote
    fn push_tag(&self, name: &str) -> impl Future<Output = Result<()>>;

    /// Push a branch to the remote
    fn push_branch(&self, name: &str, set_upstream: bool) -> impl Future<Output = Result<()>>;

    /// Merge another branch into the current branch.
    ///
    /// A conflicted merge is an expected outcome, not an error.
    fn merge(&self, source_branch: &str) -> impl Future<Output = Result<MergeOutcome>>;

    /// Abort an in-progress merge
    fn abort_merge(&self) -> impl Future<Output = Result<()>>;

    /// Name of the checked out branch, `None` when HEAD is detached
    fn current_branch(&self) -> impl Future<Output = Result<Option<String>>>;

    /// Parsed `git status --porcelain` entries
    fn status_porcelain(&self) -> impl Future<Output = Result<Vec<StatusEntry>>>;

    /// Whether the on-disk merge marker (MERGE_HEAD) is present
    fn is_merge_in_progress(&self) -> impl Future<Output = Result<bool>>;

    /// Whether `ancestor` is reachable from `descendant`
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> impl Future<Output = Result<bool>>;

    /// Check if a local tag exists
    fn tag_exists(&self, name: &str) -> impl Future<Output = Result<bool>>;

    /// Check if a local branch exists
    fn branch_exists(&self, name: &str) -> impl Future<Output = Result<bool>>;

    /// Check if a tag exists on the remote
    fn remote_tag_exists(&self, name: &str) -> impl Future<Output = Result<bool>>;

    /// Check if a branch exists on the remote
    fn remote_branch_exists(&self, name: &str) -> impl Future<Output = Result<bool>>;

    /// Delete a local tag
    fn delete_tag(&self, name: &str) -> impl Future<Output = Result<()>>;

    /// Delete a tag from the remote
    fn delete_remote_tag(&self, name: &str) -> impl Future<Output = Result<()>>;

    /// Force-delete a local branch
    fn delete_branch(&self, name: &str) -> impl Future<Output = Result<()>>;

    /// Delete a branch from the remote
    fn delete_remote_branch(&self, name: &str) -> impl Future<Output = Result<()>>;
}

/// Outcome of a merge that did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merge completed (including fast-forward and already up to date)
    Clean,
    /// Merge stopped with unresolved conflicts; MERGE_HEAD is present
    Conflicted,
}
