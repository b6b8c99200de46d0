//! # release_flow
//!
//! Git release workflow automation.
//!
//! A release of a repository with a develop and a production branch runs a
//! fixed sequence of git operations: tag develop for rollback, cut a release
//! branch, merge production into it, tag the version and push a final
//! release branch. Merge conflicts suspend the run until the operator
//! resolves them or aborts; any failure rolls back the refs the run created.
//!
//! ## Features
//!
//! - **Deterministic naming**: every ref name is a template over repository,
//!   branches and version, per workflow kind
//! - **Conflict pause**: the workflow returns a suspension to its caller and
//!   re-checks the repository before resuming
//! - **Rollback**: created tags and branches are deleted in reverse order,
//!   remote before local, each deletion independent
//! - **One run per repository**: an exclusive lock on the git directory
//!
//! ## Usage
//!
//! ```bash
//! release_flow add api /srv/api
//! release_flow plan api --version 1.4.0
//! release_flow release api --version 1.4.0
//! release_flow rollback api --version 1.4.0
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod notify;
pub mod state;
pub mod workflow;

pub use config::{BranchPair, ConfigStore, RepositoryDescriptor};
pub use error::{ReleaseError, Result};
pub use git::{GitCli, GitOperations};
pub use state::{WorkdirLease, WorkflowArtifacts};
pub use workflow::{
    ReleaseFailure, ReleaseRequest, ReleaseResult, ReleaseWorkflow, RollbackManager,
    WorkflowKind, WorkflowStatus,
};
