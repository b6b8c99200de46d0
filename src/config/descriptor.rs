//! Repository descriptors.

use crate::error::{ConfigError, Result};
use crate::git::check_ref_name;
use crate::workflow::{NamingOverrides, WorkflowKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The two long-lived branches of a repository and how they are released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPair {
    /// Integration branch releases are cut from
    pub develop: String,
    /// Branch holding what is in production
    pub production: String,
    /// Release flow variant
    #[serde(default)]
    pub kind: WorkflowKind,
}

impl Default for BranchPair {
    fn default() -> Self {
        Self {
            develop: "develop".to_string(),
            production: "master".to_string(),
            kind: WorkflowKind::Standard,
        }
    }
}

/// One configured git working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Unique name used on the command line
    pub name: String,
    /// Working directory
    pub path: PathBuf,
    /// Remote URL, informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// Branch topology
    #[serde(default)]
    pub branches: BranchPair,
    /// Naming template overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming: Option<NamingOverrides>,
}

impl RepositoryDescriptor {
    /// Descriptor with default branches and no overrides
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            remote_url: None,
            branches: BranchPair::default(),
            naming: None,
        }
    }

    /// Check everything that can be checked without running git
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ConfigError::InvalidRepository {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("repository name is empty".to_string()).into());
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(invalid("repository name contains whitespace".to_string()).into());
        }
        if !self.path.is_dir() {
            return Err(invalid(format!(
                "path {} does not exist or is not a directory",
                self.path.display()
            ))
            .into());
        }

        for (role, branch) in [
            ("develop", &self.branches.develop),
            ("production", &self.branches.production),
        ] {
            check_ref_name(branch)
                .map_err(|reason| invalid(format!("{} branch '{}': {}", role, branch, reason)))?;
        }
        if self.branches.develop == self.branches.production {
            return Err(invalid(format!(
                "develop and production are both '{}'",
                self.branches.develop
            ))
            .into());
        }

        if let Some(naming) = &self.naming {
            for (field, template) in naming.entries() {
                if !template.contains("{version}") {
                    return Err(invalid(format!(
                        "naming.{} template '{}' does not contain {{version}}",
                        field, template
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }
}
