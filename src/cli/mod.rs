//! Command line interface for release_flow.
//!
//! Argument parsing, the terminal operator prompt, coloured output and the
//! command implementations.

mod args;
pub mod commands;
mod output;
mod prompt;

pub use args::{Args, Command, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;
pub use prompt::TerminalPrompt;

/// Parse arguments without executing
pub fn parse_args() -> Args {
    Args::parse_args()
}

/// Initialise `env_logger`. `RUST_LOG` wins; otherwise `-v` selects debug
/// and the default is warnings only.
pub fn init_logging(args: &Args) {
    let default_filter = if args.verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .format_timestamp(None)
    .try_init();
}
