//! Plan command implementation.
//!
//! Prints the refs a release would create without running git.

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{ReleaseError, Result};
use crate::workflow::ReleaseRequest;

/// Execute plan command
pub(super) fn execute_plan(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Plan {
        repo,
        version_tag,
        json,
    } = &args.command
    else {
        return Err(ReleaseError::InvalidState {
            reason: "execute_plan called with another command".to_string(),
        });
    };

    let store = config.load_store()?;
    let descriptor = store.get_repository(repo)?.clone();
    let request = ReleaseRequest::new(descriptor, version_tag.as_str())?;
    let names = request.artifact_names();

    if *json {
        let json_output = serde_json::to_string_pretty(names).map_err(ReleaseError::Json)?;
        println!("{}", json_output);
        return Ok(());
    }

    let repository = request.repository();
    config.section(&format!("Release plan for {} {}", repository.name, request.version_tag()));
    config.println(&format!(
        "🔀 {} → {} ({})",
        repository.branches.production, repository.branches.develop, repository.branches.kind
    ));
    config.print_block(&names.format_plan());
    if request.profile().extra_fetch {
        config.indent(&format!(
            "{} is fetched explicitly before releasing",
            repository.branches.develop
        ));
    }
    Ok(())
}
