//! Release workflow orchestration.
//!
//! [`ReleaseWorkflow`] runs the nine release steps against a
//! [`GitOperations`] implementation:
//!
//! 1. Acquire the working directory lease, fetch and prune (legacy flows
//!    also fetch the develop branch)
//! 2. Check out and pull the develop branch
//! 3. Create and push the rollback tag
//! 4. Create the release branch from develop
//! 5. Check out and pull the production branch
//! 6. Merge production into the release branch, pausing for the operator on
//!    conflicts
//! 7. Create and push the version tag
//! 8. Push the release branch
//! 9. Create and push the final release branch
//!
//! Any failure after step 1 rolls back the refs the run created.

mod conflict;
mod naming;
mod prompt;
mod results;
mod rollback;

pub use conflict::{ConflictCoordinator, ConflictReport, ConflictState};
pub use naming::{
    ArtifactNames, NamingOverrides, NamingTemplates, NamingVars, WorkflowKind, WorkflowProfile,
};
pub use prompt::{OperatorPrompt, ResumeDecision};
pub use results::{ReleaseFailure, ReleaseResult, WorkflowStatus};
pub use rollback::{
    RollbackEntry, RollbackManager, RollbackOutcome, RollbackReport, RollbackScope, RollbackTally,
};

#[cfg(test)]
pub(crate) use prompt::testing;

use crate::config::RepositoryDescriptor;
use crate::error::{ConfigError, ReleaseError, Result};
use crate::git::{GitOperations, MergeOutcome, check_ref_name};
use crate::state::{Artifact, WorkdirLease, WorkflowArtifacts};
use std::time::Instant;

/// A validated request to release one repository at one version
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
    repository: RepositoryDescriptor,
    version_tag: String,
    profile: WorkflowProfile,
    names: ArtifactNames,
}

impl ReleaseRequest {
    /// Validate the descriptor and `version_tag`, then derive the artifact
    /// names.
    ///
    /// Versions that are not semver are accepted with a warning; versions
    /// git cannot use in a ref name are rejected.
    pub fn new(repository: RepositoryDescriptor, version_tag: impl Into<String>) -> Result<Self> {
        repository.validate()?;
        let version_tag: String = version_tag.into();
        let version_tag = version_tag.trim().to_string();
        validate_version(&version_tag)?;

        let profile =
            WorkflowProfile::with_overrides(repository.branches.kind, repository.naming.as_ref());
        let names = profile.templates.render(&NamingVars {
            repo: &repository.name,
            develop: &repository.branches.develop,
            production: &repository.branches.production,
            version: &version_tag,
        });

        for name in [
            &names.rollback_tag,
            &names.release_branch,
            &names.version_tag,
            &names.final_release_branch,
        ] {
            check_ref_name(name).map_err(|reason| ConfigError::InvalidRepository {
                name: repository.name.clone(),
                reason: format!("artifact name '{}' is not a valid ref: {}", name, reason),
            })?;
        }

        Ok(Self {
            repository,
            version_tag,
            profile,
            names,
        })
    }

    /// Repository being released
    pub fn repository(&self) -> &RepositoryDescriptor {
        &self.repository
    }

    /// Version string
    pub fn version_tag(&self) -> &str {
        &self.version_tag
    }

    /// Naming and fetch options in effect
    pub fn profile(&self) -> &WorkflowProfile {
        &self.profile
    }

    /// Names of the four artifacts
    pub fn artifact_names(&self) -> &ArtifactNames {
        &self.names
    }
}

/// Check a version string before it is used in ref names
pub fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(ConfigError::InvalidVersion {
            version: version.to_string(),
            reason: "version is empty".to_string(),
        }
        .into());
    }
    check_ref_name(version).map_err(|reason| ConfigError::InvalidVersion {
        version: version.to_string(),
        reason,
    })?;

    let bare = version.strip_prefix('v').unwrap_or(version);
    if semver::Version::parse(bare).is_err() {
        log::warn!("Version '{}' is not a semantic version; releasing anyway", version);
    }
    Ok(())
}

/// Lifecycle of a [`ReleaseWorkflow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    /// `start` has not been called
    Ready,
    /// Paused on a merge conflict
    Suspended,
    /// Finished successfully
    Completed,
    /// Finished with a terminal failure; rollback has run
    Failed,
}

enum Progress {
    Completed,
    Suspended(ConflictReport),
}

/// One release run of one repository
#[derive(Debug)]
pub struct ReleaseWorkflow<G: GitOperations> {
    git: G,
    request: ReleaseRequest,
    coordinator: ConflictCoordinator,
    rollback: RollbackManager,
    artifacts: WorkflowArtifacts,
    phase: WorkflowPhase,
    step: u8,
    run_id: String,
    lease: Option<WorkdirLease>,
    started_at: Option<Instant>,
}

impl<G: GitOperations> ReleaseWorkflow<G> {
    /// Workflow with the given collaborators
    pub fn new(
        git: G,
        request: ReleaseRequest,
        coordinator: ConflictCoordinator,
        rollback: RollbackManager,
    ) -> Self {
        Self {
            git,
            request,
            coordinator,
            rollback,
            artifacts: WorkflowArtifacts::new(),
            phase: WorkflowPhase::Ready,
            step: 0,
            run_id: uuid::Uuid::new_v4().to_string(),
            lease: None,
            started_at: None,
        }
    }

    /// Workflow with a fresh coordinator and a rollback manager that parks
    /// on the develop branch
    pub fn for_request(git: G, request: ReleaseRequest) -> Self {
        let safe_branch = request.repository.branches.develop.clone();
        Self::new(
            git,
            request,
            ConflictCoordinator::new(),
            RollbackManager::new(safe_branch),
        )
    }

    /// Names the run will create. Runs no git commands.
    pub fn plan(&self) -> ArtifactNames {
        self.request.names.clone()
    }

    /// Current phase
    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// Identifier written into the lease file
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Refs created so far
    pub fn artifacts(&self) -> &WorkflowArtifacts {
        &self.artifacts
    }

    /// Conflict the run is paused on, if any
    pub fn pending_conflict(&self) -> Option<&ConflictReport> {
        match self.phase {
            WorkflowPhase::Suspended => self.coordinator.report(),
            _ => None,
        }
    }

    /// The request being executed
    pub fn request(&self) -> &ReleaseRequest {
        &self.request
    }

    /// Run steps 1 to 6, then 7 to 9 if the merge was clean
    pub async fn start(&mut self) -> std::result::Result<WorkflowStatus, ReleaseFailure> {
        if self.phase != WorkflowPhase::Ready {
            return Err(self.misuse("start"));
        }
        self.started_at = Some(Instant::now());
        log::info!(
            "Starting release of {} at {} (run {})",
            self.request.repository.name,
            self.request.version_tag,
            self.run_id
        );

        let progress = self.begin().await;
        self.settle(progress).await
    }

    /// Continue after the operator resolved and committed the merge.
    ///
    /// If the merge is still unresolved the run stays suspended and the
    /// returned failure is resumable; nothing is rolled back.
    pub async fn resume(&mut self) -> std::result::Result<WorkflowStatus, ReleaseFailure> {
        if self.phase != WorkflowPhase::Suspended {
            return Err(self.misuse("resume"));
        }

        let progress = match self.coordinator.resume(&self.git).await {
            Ok(()) => self.finish().await,
            Err(e) => Err(e),
        };
        self.settle(progress).await
    }

    /// Abort the suspended merge and roll back
    pub async fn abort(&mut self) -> ReleaseFailure {
        if self.phase != WorkflowPhase::Suspended {
            return self.misuse("abort");
        }

        let error = match self.coordinator.abort(&self.git).await {
            Err(e) => e,
            Ok(()) => ReleaseError::InvalidState {
                reason: "merge abort did not report an abort".to_string(),
            },
        };
        self.fail(error).await
    }

    /// Drive the run to completion, asking `prompt` at every conflict
    pub async fn run<P: OperatorPrompt>(
        &mut self,
        prompt: &mut P,
    ) -> std::result::Result<ReleaseResult, ReleaseFailure> {
        let mut status = self.start().await?;
        let mut unresolved_attempt = false;

        loop {
            let report = match status {
                WorkflowStatus::Completed(result) => return Ok(result),
                WorkflowStatus::Suspended(report) => report,
            };

            let decision = match prompt.resolve_conflict(&report, unresolved_attempt).await {
                Ok(decision) => decision,
                Err(e) => {
                    log::warn!("Operator input failed, aborting: {}", e);
                    ResumeDecision::Abort
                }
            };

            match decision {
                ResumeDecision::Abort => return Err(self.abort().await),
                ResumeDecision::Continue => match self.resume().await {
                    Ok(next) => {
                        status = next;
                        unresolved_attempt = false;
                    }
                    Err(failure) if failure.is_resumable() => {
                        let Some(report) = self.pending_conflict().cloned() else {
                            return Err(failure);
                        };
                        status = WorkflowStatus::Suspended(report);
                        unresolved_attempt = true;
                    }
                    Err(failure) => return Err(failure),
                },
            }
        }
    }

    async fn begin(&mut self) -> Result<Progress> {
        self.step = 1;
        let git_dir = self.git.git_dir().await?;
        self.lease = Some(WorkdirLease::acquire(&git_dir, &self.run_id)?);

        let develop = self.request.repository.branches.develop.clone();
        let production = self.request.repository.branches.production.clone();
        let names = self.request.names.clone();

        log::info!("Step 1/9: fetching from remote");
        self.git.fetch_prune().await?;
        if self.request.profile.extra_fetch {
            if self.git.current_branch().await?.as_deref() == Some(develop.as_str()) {
                self.git.checkout(&production).await?;
            }
            self.git.fetch_branch(&develop).await?;
        }

        self.step = 2;
        log::info!("Step 2/9: updating {}", develop);
        self.git.checkout(&develop).await?;
        self.git.pull(&develop).await?;

        self.step = 3;
        log::info!("Step 3/9: creating rollback tag {}", names.rollback_tag);
        self.git.tag(&names.rollback_tag).await?;
        self.artifacts
            .mark_created(Artifact::RollbackTag, &names.rollback_tag);
        self.git.push_tag(&names.rollback_tag).await?;
        self.artifacts.mark_pushed(Artifact::RollbackTag)?;

        self.step = 4;
        log::info!("Step 4/9: creating release branch {}", names.release_branch);
        self.git
            .create_branch(&names.release_branch, &develop)
            .await?;
        self.artifacts
            .mark_created(Artifact::ReleaseBranch, &names.release_branch);

        self.step = 5;
        log::info!("Step 5/9: updating {}", production);
        self.git.checkout(&production).await?;
        self.git.pull(&production).await?;

        self.step = 6;
        log::info!("Step 6/9: merging {} into {}", production, names.release_branch);
        self.git.checkout(&names.release_branch).await?;
        match self.git.merge(&production).await? {
            MergeOutcome::Clean => self.finish().await,
            MergeOutcome::Conflicted => {
                self.coordinator
                    .detect(&self.git, &production, &names.release_branch)
                    .await?;
                let report = self.coordinator.suspend()?;
                Ok(Progress::Suspended(report))
            }
        }
    }

    async fn finish(&mut self) -> Result<Progress> {
        let names = self.request.names.clone();

        self.step = 7;
        log::info!("Step 7/9: creating version tag {}", names.version_tag);
        self.git.tag(&names.version_tag).await?;
        self.artifacts
            .mark_created(Artifact::VersionTag, &names.version_tag);
        self.git.push_tag(&names.version_tag).await?;
        self.artifacts.mark_pushed(Artifact::VersionTag)?;

        self.step = 8;
        log::info!("Step 8/9: pushing {}", names.release_branch);
        self.git.push_branch(&names.release_branch, true).await?;
        self.artifacts.mark_pushed(Artifact::ReleaseBranch)?;

        self.step = 9;
        log::info!(
            "Step 9/9: creating final release branch {}",
            names.final_release_branch
        );
        self.git
            .create_branch(&names.final_release_branch, &names.release_branch)
            .await?;
        self.artifacts
            .mark_created(Artifact::FinalBranch, &names.final_release_branch);
        self.git
            .push_branch(&names.final_release_branch, true)
            .await?;
        self.artifacts.mark_pushed(Artifact::FinalBranch)?;

        Ok(Progress::Completed)
    }

    async fn settle(
        &mut self,
        progress: Result<Progress>,
    ) -> std::result::Result<WorkflowStatus, ReleaseFailure> {
        match progress {
            Ok(Progress::Completed) => {
                self.phase = WorkflowPhase::Completed;
                self.lease = None;
                let result = ReleaseResult::succeeded(
                    &self.request.repository.name,
                    &self.artifacts,
                    self.elapsed(),
                );
                log::info!("Release of {} completed", self.request.repository.name);
                Ok(WorkflowStatus::Completed(result))
            }
            Ok(Progress::Suspended(report)) => {
                self.phase = WorkflowPhase::Suspended;
                log::info!(
                    "Release suspended on {} conflicted path(s)",
                    report.conflicted_paths.len()
                );
                Ok(WorkflowStatus::Suspended(report))
            }
            Err(error)
                if error.awaits_merge() && self.coordinator.state() == ConflictState::Suspended =>
            {
                self.phase = WorkflowPhase::Suspended;
                let result = ReleaseResult::failed(
                    &self.request.repository.name,
                    &self.artifacts,
                    &error,
                    self.elapsed(),
                );
                Err(ReleaseFailure {
                    error,
                    result,
                    rollback: None,
                })
            }
            Err(error) => Err(self.fail(error).await),
        }
    }

    async fn fail(&mut self, error: ReleaseError) -> ReleaseFailure {
        log::error!(
            "Release of {} failed at step {}/9: {}",
            self.request.repository.name,
            self.step,
            error
        );

        let report = self.rollback.rollback(&self.git, &self.artifacts).await;
        self.phase = WorkflowPhase::Failed;
        self.lease = None;

        let result = ReleaseResult::failed(
            &self.request.repository.name,
            &self.artifacts,
            &error,
            self.elapsed(),
        );
        ReleaseFailure {
            error,
            result,
            rollback: Some(report),
        }
    }

    fn misuse(&self, operation: &str) -> ReleaseFailure {
        let error = ReleaseError::InvalidState {
            reason: format!("cannot {} a workflow in phase {:?}", operation, self.phase),
        };
        let result = ReleaseResult::failed(
            &self.request.repository.name,
            &self.artifacts,
            &error,
            self.elapsed(),
        );
        ReleaseFailure {
            error,
            result,
            rollback: None,
        }
    }

    fn elapsed(&self) -> std::time::Duration {
        self.started_at
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }
}
