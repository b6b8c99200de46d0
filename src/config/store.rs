//! YAML configuration file.

use crate::config::{BranchPair, RepositoryDescriptor};
use crate::error::{ConfigError, Result};
use crate::git::GitConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory under the platform config dir
const CONFIG_DIR_NAME: &str = "release_flow";

/// File name inside [`CONFIG_DIR_NAME`]
const CONFIG_FILE_NAME: &str = "config.yaml";

/// On-disk configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFlowConfig {
    /// Version offered when prompting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_tag: Option<String>,
    /// Branches used by `add` when none are given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branches: Option<BranchPair>,
    /// Shell commands run after a successful release
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notify_commands: Vec<String>,
    /// Remote and tag settings shared by all repositories
    #[serde(default)]
    pub git: GitConfig,
    /// Configured repositories
    #[serde(default)]
    pub repositories: Vec<RepositoryDescriptor>,
}

/// Loads, queries and saves the configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: ReleaseFlowConfig,
}

impl ConfigStore {
    /// Default configuration path, `<config dir>/release_flow/config.yaml`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                ConfigError::Malformed {
                    path: PathBuf::from(CONFIG_FILE_NAME),
                    reason: "could not determine the user configuration directory".to_string(),
                }
                .into()
            })
    }

    /// Load the configuration at `path`. A missing file is an empty
    /// configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => ReleaseFlowConfig::default(),
            Ok(content) => {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Malformed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No configuration at {}, starting empty", path.display());
                ReleaseFlowConfig::default()
            }
            Err(e) => {
                return Err(ConfigError::Malformed {
                    path: path.to_path_buf(),
                    reason: format!("Failed to read file: {}", e),
                }
                .into());
            }
        };

        let store = Self {
            path: path.to_path_buf(),
            config,
        };
        store.check_unique_names()?;
        Ok(store)
    }

    /// Store for an in-memory configuration, saved to `path`
    pub fn from_config(path: impl Into<PathBuf>, config: ReleaseFlowConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Path the store saves to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The loaded configuration
    pub fn config(&self) -> &ReleaseFlowConfig {
        &self.config
    }

    /// All configured repositories, in file order
    pub fn list_repositories(&self) -> &[RepositoryDescriptor] {
        &self.config.repositories
    }

    /// Look up a repository and validate it
    pub fn get_repository(&self, name: &str) -> Result<&RepositoryDescriptor> {
        let descriptor = self
            .config
            .repositories
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ConfigError::UnknownRepository {
                name: name.to_string(),
            })?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Add a repository. Does not save.
    pub fn add_repository(&mut self, descriptor: RepositoryDescriptor) -> Result<()> {
        if self
            .config
            .repositories
            .iter()
            .any(|r| r.name == descriptor.name)
        {
            return Err(ConfigError::DuplicateRepository {
                name: descriptor.name,
            }
            .into());
        }
        descriptor.validate()?;
        self.config.repositories.push(descriptor);
        Ok(())
    }

    /// Version offered when prompting
    pub fn default_tag(&self) -> Option<&str> {
        self.config.default_tag.as_deref()
    }

    /// Branches used when `add` is given none
    pub fn default_branches(&self) -> BranchPair {
        self.config.default_branches.clone().unwrap_or_default()
    }

    /// Post-release shell commands
    pub fn notify_commands(&self) -> &[String] {
        &self.config.notify_commands
    }

    /// Git settings
    pub fn git_config(&self) -> &GitConfig {
        &self.config.git
    }

    /// Write the configuration atomically (temp file, then rename)
    pub fn save(&self) -> Result<()> {
        let save_failed = |reason: String| ConfigError::SaveFailed {
            path: self.path.clone(),
            reason,
        };

        let serialized = serde_yaml::to_string(&self.config)
            .map_err(|e| save_failed(format!("Failed to serialize configuration: {}", e)))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| save_failed(format!("Failed to create directory: {}", e)))?;
        }

        let temp_file_path = self.path.with_extension("yaml.tmp");
        {
            let mut file = fs::File::create(&temp_file_path)
                .map_err(|e| save_failed(format!("Failed to create temp file: {}", e)))?;
            file.write_all(serialized.as_bytes())
                .map_err(|e| save_failed(format!("Failed to write configuration: {}", e)))?;
            file.sync_all()
                .map_err(|e| save_failed(format!("Failed to sync file: {}", e)))?;
        }

        fs::rename(&temp_file_path, &self.path)
            .map_err(|e| save_failed(format!("Failed to rename temp file: {}", e)))?;

        log::debug!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    fn check_unique_names(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for repo in &self.config.repositories {
            if !seen.insert(repo.name.as_str()) {
                return Err(ConfigError::Malformed {
                    path: self.path.clone(),
                    reason: format!("repository '{}' is listed more than once", repo.name),
                }
                .into());
            }
        }
        Ok(())
    }
}
