//! Adapter layer between the GitOperations trait and the git executable.
//!
//! Every primitive is a single `git` invocation in the bound working
//! directory. Failures are normalized into [`GitError`] variants; a conflicted
//! merge is reported as [`MergeOutcome::Conflicted`] rather than an error.

use crate::error::{GitError, ReleaseError, Result};
use crate::git::{GitConfig, GitOperations, MergeOutcome, StatusEntry, status};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Git operations backed by the git command line
#[derive(Debug, Clone)]
pub struct GitCli {
    git: PathBuf,
    work_dir: PathBuf,
    config: GitConfig,
}

impl GitCli {
    /// Open the working directory at `path` with default configuration
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_config(path, GitConfig::default()).await
    }

    /// Open the working directory at `path` with custom configuration
    pub async fn with_config<P: AsRef<Path>>(path: P, config: GitConfig) -> Result<Self> {
        let git = which::which("git").map_err(|e| GitError::GitNotFound {
            reason: e.to_string(),
        })?;

        let work_dir = path.as_ref().to_path_buf();
        if !work_dir.is_dir() {
            return Err(GitError::NotRepository { path: work_dir }.into());
        }

        let cli = Self {
            git,
            work_dir,
            config,
        };

        let output = cli.run_raw(&["rev-parse", "--is-inside-work-tree"]).await?;
        if !output.status.success() {
            return Err(GitError::NotRepository {
                path: cli.work_dir.clone(),
            }
            .into());
        }

        Ok(cli)
    }

    /// Working directory this adapter is bound to
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Configuration in use
    pub fn config(&self) -> &GitConfig {
        &self.config
    }

    fn remote(&self) -> &str {
        &self.config.default_remote
    }

    async fn run_raw(&self, args: &[&str]) -> Result<Output> {
        log::debug!("git {} (in {})", args.join(" "), self.work_dir.display());

        Command::new(&self.git)
            .args(args)
            .current_dir(&self.work_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ReleaseError::from(GitError::CommandFailed {
                    operation: args.first().copied().unwrap_or("git").to_string(),
                    reason: format!("Failed to spawn git: {}", e),
                })
            })
    }

    /// Run git and return stdout, mapping a non-zero exit to `CommandFailed`
    async fn run(&self, operation: &str, args: &[&str]) -> Result<String> {
        let output = self.run_raw(args).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(GitError::CommandFailed {
                operation: operation.to_string(),
                reason: failure_reason(&output),
            }
            .into())
        }
    }

    async fn push(&self, refname: &str, args: &[&str]) -> Result<()> {
        let output = self.run_raw(args).await?;
        if output.status.success() {
            return Ok(());
        }

        let reason = failure_reason(&output);
        if reason.contains("rejected") || reason.contains("non-fast-forward") {
            Err(GitError::PushRejected {
                refname: refname.to_string(),
                reason,
            }
            .into())
        } else {
            Err(GitError::CommandFailed {
                operation: "push".to_string(),
                reason,
            }
            .into())
        }
    }

    async fn ref_exists(&self, refname: &str) -> Result<bool> {
        let output = self
            .run_raw(&["rev-parse", "--verify", "--quiet", refname])
            .await?;
        Ok(output.status.success())
    }

    async fn remote_ref_exists(&self, refname: &str) -> Result<bool> {
        let output = self
            .run_raw(&["ls-remote", "--exit-code", self.remote(), refname])
            .await?;
        match output.status.code() {
            Some(0) => Ok(true),
            // ls-remote --exit-code uses 2 for "no matching refs"
            Some(2) => Ok(false),
            _ => Err(GitError::CommandFailed {
                operation: "ls-remote".to_string(),
                reason: failure_reason(&output),
            }
            .into()),
        }
    }
}

impl GitOperations for GitCli {
    async fn git_dir(&self) -> Result<PathBuf> {
        let stdout = self
            .run("rev-parse", &["rev-parse", "--absolute-git-dir"])
            .await?;
        Ok(PathBuf::from(stdout.trim()))
    }

    async fn fetch_prune(&self) -> Result<()> {
        self.run("fetch", &["fetch", "--prune", self.remote()])
            .await?;
        Ok(())
    }

    async fn fetch_branch(&self, branch: &str) -> Result<()> {
        if self.current_branch().await?.as_deref() == Some(branch) {
            return Err(GitError::CheckedOutBranch {
                branch: branch.to_string(),
            }
            .into());
        }

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        self.run("fetch", &["fetch", self.remote(), &refspec]).await?;
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> Result<()> {
        let output = self.run_raw(&["checkout", branch]).await?;
        if output.status.success() {
            return Ok(());
        }

        let remote_ref = format!("refs/remotes/{}/{}", self.remote(), branch);
        if !self.branch_exists(branch).await? && !self.ref_exists(&remote_ref).await? {
            return Err(GitError::RefNotFound {
                name: branch.to_string(),
            }
            .into());
        }

        Err(GitError::CommandFailed {
            operation: "checkout".to_string(),
            reason: failure_reason(&output),
        }
        .into())
    }

    async fn pull(&self, branch: &str) -> Result<()> {
        self.run("pull", &["pull", "--ff-only", self.remote(), branch])
            .await?;
        Ok(())
    }

    async fn create_branch(&self, new_branch: &str, from_ref: &str) -> Result<()> {
        if self.branch_exists(new_branch).await? {
            return Err(GitError::BranchExists {
                branch: new_branch.to_string(),
            }
            .into());
        }

        self.run("checkout", &["checkout", "-b", new_branch, from_ref])
            .await?;
        Ok(())
    }

    async fn tag(&self, name: &str) -> Result<()> {
        if self.tag_exists(name).await? {
            return Err(GitError::TagExists {
                tag: name.to_string(),
            }
            .into());
        }

        if self.config.annotated_tags {
            let message = self.config.generate_tag_message(name);
            self.run("tag", &["tag", "-a", name, "-m", &message]).await?;
        } else {
            self.run("tag", &["tag", name]).await?;
        }
        Ok(())
    }

    async fn push_tag(&self, name: &str) -> Result<()> {
        let refspec = format!("refs/tags/{}", name);
        self.push(name, &["push", self.remote(), &refspec]).await
    }

    async fn push_branch(&self, name: &str, set_upstream: bool) -> Result<()> {
        // Full refs so a tag with the same name cannot be picked up
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", name);
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        args.push(self.remote());
        args.push(&refspec);
        self.push(name, &args).await
    }

    async fn merge(&self, source_branch: &str) -> Result<MergeOutcome> {
        let output = self
            .run_raw(&["merge", "--no-edit", source_branch])
            .await?;
        if output.status.success() {
            return Ok(MergeOutcome::Clean);
        }

        let entries = self.status_porcelain().await?;
        if self.is_merge_in_progress().await? || entries.iter().any(StatusEntry::is_unmerged) {
            log::info!("Merge of '{}' stopped with conflicts", source_branch);
            return Ok(MergeOutcome::Conflicted);
        }

        Err(GitError::CommandFailed {
            operation: "merge".to_string(),
            reason: failure_reason(&output),
        }
        .into())
    }

    async fn abort_merge(&self) -> Result<()> {
        self.run("merge", &["merge", "--abort"]).await?;
        Ok(())
    }

    async fn current_branch(&self) -> Result<Option<String>> {
        let output = self
            .run_raw(&["symbolic-ref", "--quiet", "--short", "HEAD"])
            .await?;
        if output.status.success() {
            Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ))
        } else {
            // Exit code 1 with --quiet means HEAD is detached
            Ok(None)
        }
    }

    async fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        let stdout = self.run("status", &["status", "--porcelain", "-z"]).await?;
        Ok(status::parse_porcelain(&stdout))
    }

    async fn is_merge_in_progress(&self) -> Result<bool> {
        Ok(self.git_dir().await?.join("MERGE_HEAD").exists())
    }

    async fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let output = self
            .run_raw(&["merge-base", "--is-ancestor", ancestor, descendant])
            .await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(GitError::CommandFailed {
                operation: "merge-base".to_string(),
                reason: failure_reason(&output),
            }
            .into()),
        }
    }

    async fn tag_exists(&self, name: &str) -> Result<bool> {
        self.ref_exists(&format!("refs/tags/{}", name)).await
    }

    async fn branch_exists(&self, name: &str) -> Result<bool> {
        self.ref_exists(&format!("refs/heads/{}", name)).await
    }

    async fn remote_tag_exists(&self, name: &str) -> Result<bool> {
        self.remote_ref_exists(&format!("refs/tags/{}", name)).await
    }

    async fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        self.remote_ref_exists(&format!("refs/heads/{}", name))
            .await
    }

    async fn delete_tag(&self, name: &str) -> Result<()> {
        self.run("tag", &["tag", "-d", name]).await?;
        Ok(())
    }

    async fn delete_remote_tag(&self, name: &str) -> Result<()> {
        let refspec = format!("refs/tags/{}", name);
        self.push(name, &["push", self.remote(), "--delete", &refspec])
            .await
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        self.run("branch", &["branch", "-D", name]).await?;
        Ok(())
    }

    async fn delete_remote_branch(&self, name: &str) -> Result<()> {
        let refspec = format!("refs/heads/{}", name);
        self.push(name, &["push", self.remote(), "--delete", &refspec])
            .await
    }
}

fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.trim() {
        "" => format!("exited with {}", output.status),
        s => s.to_string(),
    }
}
