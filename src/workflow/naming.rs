//! Deterministic artifact naming.
//!
//! Every ref a release creates is derived from a template with the
//! placeholders `{repo}`, `{develop}`, `{production}` and `{version}`.
//! Templates are fixed per [`WorkflowKind`] and can be overridden per
//! repository.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Branch topology of a repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    /// Two-branch flow: develop and production
    #[default]
    Standard,
    /// Three-branch flow that fetches develop explicitly before releasing
    #[serde(alias = "custom")]
    Legacy,
}

impl WorkflowKind {
    /// Naming templates and step options for this kind
    pub fn profile(self) -> WorkflowProfile {
        match self {
            WorkflowKind::Standard => WorkflowProfile {
                templates: NamingTemplates {
                    rollback_tag: "rollback_{develop}_v{version}".to_string(),
                    release_branch: "release_{develop}_{version}".to_string(),
                    version_tag: "v_{repo}_{version}".to_string(),
                    final_release_branch: "release_{production}_{version}".to_string(),
                },
                extra_fetch: false,
            },
            WorkflowKind::Legacy => WorkflowProfile {
                templates: NamingTemplates {
                    rollback_tag: "rollback_{develop}_v{version}".to_string(),
                    release_branch: "release_{develop}_{version}".to_string(),
                    version_tag: "{version}".to_string(),
                    final_release_branch: "release_{production}_{develop}_{version}"
                        .to_string(),
                },
                extra_fetch: true,
            },
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowKind::Standard => f.write_str("standard"),
            WorkflowKind::Legacy => f.write_str("legacy"),
        }
    }
}

impl std::str::FromStr for WorkflowKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(WorkflowKind::Standard),
            "legacy" | "custom" => Ok(WorkflowKind::Legacy),
            other => Err(format!(
                "unknown workflow kind '{}' (expected standard or legacy)",
                other
            )),
        }
    }
}

/// Per-kind configuration record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowProfile {
    /// Templates for the four artifact names
    pub templates: NamingTemplates,
    /// Fetch the develop branch into its local namesake before step 2
    pub extra_fetch: bool,
}

impl WorkflowProfile {
    /// Profile for `kind` with the templates set in `overrides` replacing
    /// the defaults
    pub fn with_overrides(kind: WorkflowKind, overrides: Option<&NamingOverrides>) -> Self {
        let mut profile = kind.profile();
        if let Some(overrides) = overrides {
            profile.templates.apply(overrides);
        }
        profile
    }
}

/// Complete set of naming templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTemplates {
    /// Tag marking develop before the release
    pub rollback_tag: String,
    /// Branch the merge happens on
    pub release_branch: String,
    /// Tag naming the released version
    pub version_tag: String,
    /// Production-named copy of the release branch
    pub final_release_branch: String,
}

impl NamingTemplates {
    fn apply(&mut self, overrides: &NamingOverrides) {
        if let Some(t) = &overrides.rollback_tag {
            self.rollback_tag = t.clone();
        }
        if let Some(t) = &overrides.release_branch {
            self.release_branch = t.clone();
        }
        if let Some(t) = &overrides.version_tag {
            self.version_tag = t.clone();
        }
        if let Some(t) = &overrides.final_release_branch {
            self.final_release_branch = t.clone();
        }
    }

    /// Render all four names
    pub fn render(&self, vars: &NamingVars<'_>) -> ArtifactNames {
        ArtifactNames {
            rollback_tag: vars.render(&self.rollback_tag),
            release_branch: vars.render(&self.release_branch),
            version_tag: vars.render(&self.version_tag),
            final_release_branch: vars.render(&self.final_release_branch),
        }
    }
}

/// Optional per-repository template overrides, as stored in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingOverrides {
    /// Rollback tag template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_tag: Option<String>,
    /// Release branch template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_branch: Option<String>,
    /// Version tag template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_tag: Option<String>,
    /// Final release branch template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_release_branch: Option<String>,
}

impl NamingOverrides {
    /// Templates that are set, with their field names
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("rollback_tag", &self.rollback_tag),
            ("release_branch", &self.release_branch),
            ("version_tag", &self.version_tag),
            ("final_release_branch", &self.final_release_branch),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

/// Values substituted into templates
#[derive(Debug, Clone, Copy)]
pub struct NamingVars<'a> {
    /// Repository name
    pub repo: &'a str,
    /// Develop branch name
    pub develop: &'a str,
    /// Production branch name
    pub production: &'a str,
    /// Version string
    pub version: &'a str,
}

impl NamingVars<'_> {
    fn render(&self, template: &str) -> String {
        template
            .replace("{repo}", self.repo)
            .replace("{develop}", self.develop)
            .replace("{production}", self.production)
            .replace("{version}", self.version)
    }
}

/// The four refs a release creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactNames {
    /// Rollback tag
    pub rollback_tag: String,
    /// Release branch
    pub release_branch: String,
    /// Version tag
    pub version_tag: String,
    /// Final release branch
    pub final_release_branch: String,
}

impl ArtifactNames {
    /// Format names for display
    pub fn format_plan(&self) -> String {
        format!(
            "🏷️  Rollback tag:         {}\n\
             🌿 Release branch:       {}\n\
             🏷️  Version tag:          {}\n\
             🌿 Final release branch: {}\n",
            self.rollback_tag, self.release_branch, self.version_tag, self.final_release_branch
        )
    }
}
