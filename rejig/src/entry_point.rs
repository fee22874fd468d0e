//! Shared entry point for every binary front-end.

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::commands;

/// Parses arguments and dispatches to the command handlers. Returns the
/// process exit code: 0 clean, 1 for errors or pending dry-run changes,
/// 2 for usage errors.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    let mut full_args = vec!["rejig".to_owned()];
    full_args.extend(args);
    let cli = match Cli::try_parse_from(&full_args) {
        Ok(cli) => cli,
        Err(err) => {
            // Help/version are not usage errors.
            let code = if err.use_stderr() { 2 } else { 0 };
            let _ = err.print();
            return Ok(code);
        }
    };
    match cli.command {
        Command::Run(run) => commands::run(&run),
        Command::List(list) => commands::list(&list),
    }
}
