// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The short flags keep the classic getopt surface (`-f`, `-d`, `-0`, `-g`,
//! `-h`). Parse errors print the help text and exit 1 rather than clap's
//! usual exit code 2.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};

use crate::backend;
use crate::types::BackendKind;

/// Command-line arguments for `ogwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ogwatch",
    version,
    about = "Watch a directory tree and print one line per filesystem change.",
    long_about = None
)]
pub struct CliArgs {
    /// Comma-separated list of file events to see.
    #[arg(short = 'f', value_name = "FILE_EVENTS")]
    pub file_events: Option<String>,

    /// Comma-separated list of directory events to see.
    #[arg(short = 'd', value_name = "DIR_EVENTS")]
    pub dir_events: Option<String>,

    /// Use null character as terminator for output lines.
    #[arg(short = '0')]
    pub null_terminator: bool,

    /// Enable generic output mode, printing only paths.
    #[arg(short = 'g')]
    pub generic: bool,

    /// Notification backend (defaults to the native one for this platform).
    #[arg(long, value_enum, value_name = "BACKEND")]
    pub backend: Option<BackendKind>,

    /// Optional TOML config file; command-line flags take precedence.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Minimum interval between two stale-reference notices.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `OGWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Directory to watch.
    #[arg(value_name = "DIRECTORY")]
    pub root: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// The clap command with the per-backend event list appended to the help.
pub fn command() -> clap::Command {
    CliArgs::command().after_help(events_help())
}

/// Parse arguments from an explicit iterator (first item is the program name).
pub fn try_parse_from<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    CliArgs::from_arg_matches(&matches)
}

/// Parse `std::env::args_os()`, exiting on `-h`, `-V` or a parse error.
pub fn parse() -> CliArgs {
    match try_parse_from(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => err.exit(),
            _ => {
                eprintln!("{}", err.render());
                // Best effort; we are exiting either way.
                let _ = command().print_help();
                std::process::exit(1);
            }
        },
    }
}

fn events_help() -> String {
    let mut help = String::from(
        "Events:\nThe events you can monitor are specific to the backend in use:\n",
    );
    for kind in [BackendKind::Fanotify, BackendKind::Fsevents, BackendKind::Notify] {
        let marker = if kind == BackendKind::default() { " (default)" } else { "" };
        help.push_str(&format!("\n{kind}{marker}:\n"));
        for name in backend::mapping_for(kind).names() {
            help.push_str("  ");
            help.push_str(name);
            help.push('\n');
        }
    }
    help
}
