//! Git operations for release workflows.
//!
//! This module provides the [`GitOperations`] seam the workflow is written
//! against, and [`GitCli`], the implementation that drives the git executable.

mod config;
mod git_adapter;
mod operations;
pub mod refname;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use config::GitConfig;
pub use git_adapter::GitCli;
pub use operations::{GitOperations, MergeOutcome};
pub use refname::check_ref_name;
pub use status::StatusEntry;
