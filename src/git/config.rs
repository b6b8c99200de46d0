//! Configuration for Git operations.

use serde::{Deserialize, Serialize};

/// Configuration for Git operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote name used for fetch, pull, push and remote deletions
    #[serde(rename = "remote")]
    pub default_remote: String,
    /// Whether to create annotated tags instead of lightweight ones
    pub annotated_tags: bool,
    /// Custom tag message template (`{tag}` is substituted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_message_template: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            default_remote: "origin".to_string(),
            annotated_tags: false,
            tag_message_template: None,
        }
    }
}

impl GitConfig {
    /// Generate the message for an annotated tag
    pub fn generate_tag_message(&self, tag: &str) -> String {
        if let Some(ref template) = self.tag_message_template {
            template.replace("{tag}", tag)
        } else {
            format!("Release {}", tag)
        }
    }
}
