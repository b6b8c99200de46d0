//! State management for release runs.
//!
//! This module tracks the refs a run creates and holds the exclusive
//! working-directory lease that keeps release runs from overlapping.

mod artifacts;
mod lease;

pub use artifacts::{Artifact, ArtifactState, WorkflowArtifacts};
pub use lease::{LEASE_FILE_NAME, LeaseInfo, WorkdirLease};
