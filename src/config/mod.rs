//! Configuration store.
//!
//! Repositories, their branch topology and release defaults live in a YAML
//! file. Everything here is validated before any git command runs.

mod descriptor;
mod store;

pub use descriptor::{BranchPair, RepositoryDescriptor};
pub use store::{ConfigStore, ReleaseFlowConfig};
