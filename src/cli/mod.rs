// src/cli/mod.rs

//! Terminal front end: arguments, demo host and REPL.

use clap::Parser;

pub mod commands;
pub mod repl;

/// devconsole: an interactive developer console for a running application.
///
/// Without `--command`, lines are read from stdin and each one is handled as a
/// console line. Besides the registered commands, the REPL understands:
///
/// - `toggle` (or the configured toggle key, e.g. `F5`): show or hide the overlay
/// - `quit` / `exit`: leave the session
///
/// Try `help` for the list of commands.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Path to a TOML configuration file. `~` and environment variables are expanded.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Start with the overlay shown, overriding the configuration.
    #[arg(long)]
    pub visible: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Run this console line and exit. May be given several times; lines run in order.
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub commands: Vec<String>,
}
