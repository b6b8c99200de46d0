//! Repository configuration commands.

use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{BranchPair, RepositoryDescriptor};
use crate::error::{ReleaseError, Result};

/// Execute list command
pub(super) fn execute_list(config: &RuntimeConfig) -> Result<()> {
    let store = config.load_store()?;
    let repositories = store.list_repositories();

    if repositories.is_empty() {
        config.println("No repositories configured");
        config.indent("Add one with: release_flow add <name> <path>");
        return Ok(());
    }

    for repo in repositories {
        config.println(&format!(
            "📦 {}  {}  ({} → {}, {})",
            repo.name,
            repo.path.display(),
            repo.branches.production,
            repo.branches.develop,
            repo.branches.kind
        ));
        if let Some(url) = &repo.remote_url {
            config.indent(url);
        }
    }
    Ok(())
}

/// Execute add command
pub(super) fn execute_add(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Add {
        name,
        path,
        remote_url,
        develop,
        production,
        kind,
    } = &args.command
    else {
        return Err(ReleaseError::InvalidState {
            reason: "execute_add called with another command".to_string(),
        });
    };

    let mut store = config.load_store()?;
    let defaults = store.default_branches();
    let path = std::path::absolute(path)?;

    let descriptor = RepositoryDescriptor {
        name: name.clone(),
        path,
        remote_url: remote_url.clone(),
        branches: BranchPair {
            develop: develop.clone().unwrap_or(defaults.develop),
            production: production.clone().unwrap_or(defaults.production),
            kind: kind.unwrap_or(defaults.kind),
        },
        naming: None,
    };

    store.add_repository(descriptor)?;
    store.save()?;
    config.success_println(&format!(
        "Added {} to {}",
        name,
        store.path().display()
    ));
    Ok(())
}
