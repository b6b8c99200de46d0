//! In-memory [`GitOperations`] fake for unit tests.
//!
//! Tracks refs, the checked out branch and merge state; individual operations
//! can be scripted to fail by key (`"push_tag"`) or key and argument
//! (`"push_tag:v_api_1.0.0"`). Every call is recorded in order.

use crate::error::{GitError, Result};
use crate::git::{GitOperations, MergeOutcome, StatusEntry};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub current: Option<String>,
    pub local_branches: BTreeSet<String>,
    pub remote_branches: BTreeSet<String>,
    pub local_tags: BTreeSet<String>,
    pub remote_tags: BTreeSet<String>,
    pub merge_in_progress: bool,
    pub status: Vec<StatusEntry>,
    pub conflict_paths: Vec<String>,
    pub merged: BTreeSet<String>,
    pub pending_merge: Option<String>,
    pub failures: HashMap<String, String>,
    pub calls: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeGit {
    git_dir: PathBuf,
    state: Arc<Mutex<FakeState>>,
}

impl FakeGit {
    /// Repository with `develop` and `master` both local and remote, on `develop`
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        let mut state = FakeState {
            current: Some("develop".to_string()),
            ..FakeState::default()
        };
        for branch in ["develop", "master"] {
            state.local_branches.insert(branch.to_string());
            state.remote_branches.insert(branch.to_string());
        }
        Self {
            git_dir: git_dir.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn fail(&self, key: &str, reason: &str) {
        self.state()
            .failures
            .insert(key.to_string(), reason.to_string());
    }

    /// Next merge stops with these paths unmerged
    pub fn conflict_on_merge(&self, paths: &[&str]) {
        self.state().conflict_paths = paths.iter().map(|p| p.to_string()).collect();
    }

    /// Operator resolved every path and committed the merge
    pub fn resolve_and_commit(&self) {
        let mut state = self.state();
        state.merge_in_progress = false;
        state.status.clear();
        if let Some(source) = state.pending_merge.take() {
            state.merged.insert(source);
        }
    }

    /// Operator ran `git merge --abort` by hand
    pub fn abandon_merge(&self) {
        let mut state = self.state();
        state.merge_in_progress = false;
        state.status.clear();
        state.pending_merge = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, op: &str, arg: &str) -> Result<MutexGuard<'_, FakeState>> {
        let mut state = self.state();
        let call = if arg.is_empty() {
            op.to_string()
        } else {
            format!("{}:{}", op, arg)
        };
        state.calls.push(call.clone());

        let reason = state
            .failures
            .get(&call)
            .or_else(|| state.failures.get(op))
            .cloned();
        match reason {
            Some(reason) => Err(GitError::CommandFailed {
                operation: op.to_string(),
                reason,
            }
            .into()),
            None => Ok(state),
        }
    }
}

impl GitOperations for FakeGit {
    async fn git_dir(&self) -> Result<PathBuf> {
        Ok(self.git_dir.clone())
    }

    async fn fetch_prune(&self) -> Result<()> {
        self.record("fetch_prune", "")?;
        Ok(())
    }

    async fn fetch_branch(&self, branch: &str) -> Result<()> {
        let mut state = self.record("fetch_branch", branch)?;
        if state.current.as_deref() == Some(branch) {
            return Err(GitError::CheckedOutBranch {
                branch: branch.to_string(),
            }
            .into());
        }
        state.local_branches.insert(branch.to_string());
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> Result<()> {
        let mut state = self.record("checkout", branch)?;
        if !state.local_branches.contains(branch) && !state.remote_branches.contains(branch) {
            return Err(GitError::RefNotFound {
                name: branch.to_string(),
            }
            .into());
        }
        state.local_branches.insert(branch.to_string());
        state.current = Some(branch.to_string());
        Ok(())
    }

    async fn pull(&self, branch: &str) -> Result<()> {
        self.record("pull", branch)?;
        Ok(())
    }

    async fn create_branch(&self, new_branch: &str, from_ref: &str) -> Result<()> {
        let mut state = self.record("create_branch", new_branch)?;
        if state.local_branches.contains(new_branch) {
            return Err(GitError::BranchExists {
                branch: new_branch.to_string(),
            }
            .into());
        }
        if !state.local_branches.contains(from_ref) {
            return Err(GitError::RefNotFound {
                name: from_ref.to_string(),
            }
            .into());
        }
        state.local_branches.insert(new_branch.to_string());
        state.current = Some(new_branch.to_string());
        Ok(())
    }

    async fn tag(&self, name: &str) -> Result<()> {
        let mut state = self.record("tag", name)?;
        if !state.local_tags.insert(name.to_string()) {
            return Err(GitError::TagExists {
                tag: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn push_tag(&self, name: &str) -> Result<()> {
        let mut state = self.record("push_tag", name)?;
        state.remote_tags.insert(name.to_string());
        Ok(())
    }

    async fn push_branch(&self, name: &str, _set_upstream: bool) -> Result<()> {
        let mut state = self.record("push_branch", name)?;
        state.remote_branches.insert(name.to_string());
        Ok(())
    }

    async fn merge(&self, source_branch: &str) -> Result<MergeOutcome> {
        let mut state = self.record("merge", source_branch)?;
        if state.conflict_paths.is_empty() {
            state.merged.insert(source_branch.to_string());
            return Ok(MergeOutcome::Clean);
        }
        state.pending_merge = Some(source_branch.to_string());
        let paths = std::mem::take(&mut state.conflict_paths);
        state.status = paths
            .into_iter()
            .map(|path| StatusEntry {
                index: 'U',
                worktree: 'U',
                path,
            })
            .collect();
        state.merge_in_progress = true;
        Ok(MergeOutcome::Conflicted)
    }

    async fn abort_merge(&self) -> Result<()> {
        let mut state = self.record("abort_merge", "")?;
        state.merge_in_progress = false;
        state.status.clear();
        state.pending_merge = None;
        Ok(())
    }

    async fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.state().current.clone())
    }

    async fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        Ok(self.state().status.clone())
    }

    async fn is_merge_in_progress(&self) -> Result<bool> {
        Ok(self.state().merge_in_progress)
    }

    async fn is_ancestor(&self, ancestor: &str, _descendant: &str) -> Result<bool> {
        Ok(self.state().merged.contains(ancestor))
    }

    async fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().local_tags.contains(name))
    }

    async fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().local_branches.contains(name))
    }

    async fn remote_tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().remote_tags.contains(name))
    }

    async fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state().remote_branches.contains(name))
    }

    async fn delete_tag(&self, name: &str) -> Result<()> {
        let mut state = self.record("delete_tag", name)?;
        if !state.local_tags.remove(name) {
            return Err(missing(name));
        }
        Ok(())
    }

    async fn delete_remote_tag(&self, name: &str) -> Result<()> {
        let mut state = self.record("delete_remote_tag", name)?;
        if !state.remote_tags.remove(name) {
            return Err(missing(name));
        }
        Ok(())
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        let mut state = self.record("delete_branch", name)?;
        if state.current.as_deref() == Some(name) {
            return Err(GitError::CommandFailed {
                operation: "branch".to_string(),
                reason: format!("Cannot delete branch '{}' checked out", name),
            }
            .into());
        }
        if !state.local_branches.remove(name) {
            return Err(missing(name));
        }
        Ok(())
    }

    async fn delete_remote_branch(&self, name: &str) -> Result<()> {
        let mut state = self.record("delete_remote_branch", name)?;
        if !state.remote_branches.remove(name) {
            return Err(missing(name));
        }
        Ok(())
    }
}

/// Real git refuses to delete refs that do not exist
fn missing(name: &str) -> crate::error::ReleaseError {
    GitError::RefNotFound {
        name: name.to_string(),
    }
    .into()
}
