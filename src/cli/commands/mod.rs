//! Command execution.
//!
//! Each command loads the configuration, validates its inputs before
//! touching git, and reports through [`RuntimeConfig`].

mod plan;
mod release;
mod repos;
mod rollback;
mod status;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, ReleaseError, Result};

use plan::execute_plan;
use release::execute_release;
use repos::{execute_add, execute_list};
use rollback::execute_rollback;
use status::execute_status;

/// Execute the command in `args` and return the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(
            &CliError::InvalidArguments {
                reason: validation_error,
            }
            .to_string(),
        );
        return Ok(1);
    }

    let config = RuntimeConfig::from_args(&args)?;

    let result = match &args.command {
        // Release prints its own summary and failure report
        Command::Release { .. } => execute_release(&args, &config).await,
        Command::Plan { .. } => execute_plan(&args, &config).map(|()| 0),
        Command::Rollback { .. } => execute_rollback(&args, &config).await.map(|()| 0),
        Command::Status { .. } => execute_status(&args, &config).await.map(|()| 0),
        Command::List => execute_list(&config).map(|()| 0),
        Command::Add { .. } => execute_add(&args, &config).map(|()| 0),
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));
            print_suggestions(&config, &e);
            Ok(1)
        }
    }
}

/// Print recovery suggestions for `error`
fn print_suggestions(config: &RuntimeConfig, error: &ReleaseError) {
    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() {
        config.println("\n💡 Recovery suggestions:");
        for suggestion in suggestions {
            config.println(&format!("  • {}", suggestion));
        }
    }
}
