//! Artifact tracking for a single release run.

use crate::error::{ReleaseError, Result};
use serde::Serialize;
use std::fmt;

/// A ref the release workflow creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Artifact {
    /// Tag marking the pre-release state of the develop branch
    RollbackTag,
    /// Branch isolating the merge of production into develop's changes
    ReleaseBranch,
    /// Tag naming the released version
    VersionTag,
    /// Production-named copy of the merged release branch
    FinalBranch,
}

impl Artifact {
    /// All artifacts, in the order the workflow creates them
    pub const CREATION_ORDER: [Artifact; 4] = [
        Artifact::RollbackTag,
        Artifact::ReleaseBranch,
        Artifact::VersionTag,
        Artifact::FinalBranch,
    ];

    /// Whether this artifact is a tag (otherwise a branch)
    pub fn is_tag(self) -> bool {
        matches!(self, Artifact::RollbackTag | Artifact::VersionTag)
    }

    fn index(self) -> usize {
        match self {
            Artifact::RollbackTag => 0,
            Artifact::ReleaseBranch => 1,
            Artifact::VersionTag => 2,
            Artifact::FinalBranch => 3,
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Artifact::RollbackTag => "rollback tag",
            Artifact::ReleaseBranch => "release branch",
            Artifact::VersionTag => "version tag",
            Artifact::FinalBranch => "final release branch",
        };
        f.write_str(label)
    }
}

/// Lifecycle of one artifact. During a run `Pushed` is only reachable from
/// `Created`. `RemoteOnly` is only recorded when refs are discovered in a
/// clone that lacks the local ref.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtifactState {
    /// Not created in this run
    #[default]
    NotCreated,
    /// Exists locally
    Created,
    /// Exists locally and on the remote
    Pushed,
    /// Exists on the remote only
    RemoteOnly,
}

impl ArtifactState {
    /// Whether the local ref exists
    pub fn is_local(self) -> bool {
        matches!(self, ArtifactState::Created | ArtifactState::Pushed)
    }

    /// Whether the remote ref exists
    pub fn is_remote(self) -> bool {
        matches!(self, ArtifactState::Pushed | ArtifactState::RemoteOnly)
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    name: Option<String>,
    state: ArtifactState,
}

/// Refs created during one run, consumed by the rollback manager
#[derive(Debug, Clone, Default)]
pub struct WorkflowArtifacts {
    slots: [Slot; 4],
}

impl WorkflowArtifacts {
    /// Empty record: nothing created
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `artifact` was created locally under `name`
    pub fn mark_created(&mut self, artifact: Artifact, name: impl Into<String>) {
        let slot = &mut self.slots[artifact.index()];
        slot.name = Some(name.into());
        slot.state = match slot.state {
            ArtifactState::NotCreated => ArtifactState::Created,
            ArtifactState::RemoteOnly => ArtifactState::Pushed,
            state => state,
        };
    }

    /// Record that `artifact` exists under `name` on the remote but not
    /// locally
    pub fn mark_remote_only(&mut self, artifact: Artifact, name: impl Into<String>) {
        let slot = &mut self.slots[artifact.index()];
        slot.name = Some(name.into());
        slot.state = match slot.state {
            ArtifactState::Created | ArtifactState::Pushed => ArtifactState::Pushed,
            _ => ArtifactState::RemoteOnly,
        };
    }

    /// Record that `artifact` was pushed. Fails if it was never created.
    pub fn mark_pushed(&mut self, artifact: Artifact) -> Result<()> {
        let slot = &mut self.slots[artifact.index()];
        match slot.state {
            ArtifactState::NotCreated => {
                return Err(ReleaseError::InvalidState {
                    reason: format!("{} marked pushed before it was created", artifact),
                });
            }
            ArtifactState::RemoteOnly => {}
            _ => slot.state = ArtifactState::Pushed,
        }
        Ok(())
    }

    /// Current state of `artifact`
    pub fn state(&self, artifact: Artifact) -> ArtifactState {
        self.slots[artifact.index()].state
    }

    /// Ref name of `artifact`, if it was created
    pub fn name(&self, artifact: Artifact) -> Option<&str> {
        self.slots[artifact.index()].name.as_deref()
    }

    /// Whether `artifact` exists anywhere
    pub fn is_created(&self, artifact: Artifact) -> bool {
        self.state(artifact) != ArtifactState::NotCreated
    }

    /// Whether `artifact` exists on the remote
    pub fn is_pushed(&self, artifact: Artifact) -> bool {
        self.state(artifact).is_remote()
    }

    /// Whether nothing was created
    pub fn is_empty(&self) -> bool {
        Artifact::CREATION_ORDER
            .iter()
            .all(|a| !self.is_created(*a))
    }

    /// Created artifacts with their names and states, most recent first
    pub fn created_in_reverse(&self) -> Vec<(Artifact, String, ArtifactState)> {
        Artifact::CREATION_ORDER
            .iter()
            .rev()
            .filter_map(|a| {
                let slot = &self.slots[a.index()];
                match (&slot.name, slot.state) {
                    (Some(name), state) if state != ArtifactState::NotCreated => {
                        Some((*a, name.clone(), state))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    /// Rollback tag was created
    pub fn rollback_tag_created(&self) -> bool {
        self.is_created(Artifact::RollbackTag)
    }

    /// Rollback tag was pushed
    pub fn rollback_tag_pushed(&self) -> bool {
        self.is_pushed(Artifact::RollbackTag)
    }

    /// Release branch was created
    pub fn release_branch_created(&self) -> bool {
        self.is_created(Artifact::ReleaseBranch)
    }

    /// Release branch was pushed
    pub fn release_branch_pushed(&self) -> bool {
        self.is_pushed(Artifact::ReleaseBranch)
    }

    /// Version tag was created
    pub fn version_tag_created(&self) -> bool {
        self.is_created(Artifact::VersionTag)
    }

    /// Version tag was pushed
    pub fn version_tag_pushed(&self) -> bool {
        self.is_pushed(Artifact::VersionTag)
    }

    /// Final release branch was created
    pub fn final_branch_created(&self) -> bool {
        self.is_created(Artifact::FinalBranch)
    }

    /// Final release branch was pushed
    pub fn final_branch_pushed(&self) -> bool {
        self.is_pushed(Artifact::FinalBranch)
    }
}
