//! Command-line interface arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.rejig.toml):
  Create this file in your project root to set defaults.

  [rejig]
  recipes = [\"order-imports\", \"remove-unused-imports\"]
  exclude_folders = [\"build\", \"target\"]

  [rejig.rename_method]
  pattern = \"com.foo.Bar doThing(int, String)\"
  new_name = \"doSomething\"

  [rejig.change_type]
  old_type = \"java.util.ArrayList\"
  new_type = \"java.util.LinkedList\"

  [style.indentation]
  use_tabs = false
  width = 4

  [style.imports]
  groups = [\"java\", \"javax\"]
  star_import_threshold = 5
";

/// Source-to-source transformation for Java sources: lossless parsing,
/// pattern-matched visitors, and byte-exact printing.
#[derive(Parser, Debug)]
#[command(name = "rejig", after_help = CONFIG_HELP)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run recipes over source files.
    Run(RunArgs),
    /// List the available recipes.
    List(ListArgs),
}

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
pub struct OutputOptions {
    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Show every scanned file, not only changed ones.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a diff for each changed file.
    #[arg(long)]
    pub diff: bool,
}

/// Arguments for `rejig run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Paths to process (files or directories). Defaults to the current
    /// directory.
    pub paths: Vec<PathBuf>,

    /// Recipe ids to run, overriding the configuration file.
    #[arg(short, long = "recipe")]
    pub recipes: Vec<String>,

    /// Report what would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,

    /// Explicit configuration file path.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for `rejig list`.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,
}
