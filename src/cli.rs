// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::types::parse_duration;

/// Command-line arguments for `wsrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wsrun",
    version,
    about = "Run a script across workspace packages in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Script to run in each selected package (e.g. `build`).
    #[arg(value_name = "SCRIPT")]
    pub script: String,

    /// Package name regexes; a package is selected if any of them matches.
    ///
    /// Default: every package.
    #[arg(value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Also run the script in the dependencies of selected packages.
    #[arg(short = 'u', long)]
    pub upstream: bool,

    /// Also run the script in the dependents of selected packages.
    #[arg(short = 'd', long)]
    pub downstream: bool,

    /// Run all packages concurrently instead of one after another.
    #[arg(short = 'p', long)]
    pub parallel: bool,

    /// Delay between consecutive starts in parallel mode (e.g. `500ms`, `2s`).
    ///
    /// Implies `--parallel`.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub stagger: Option<Duration>,

    /// Workspace root to operate in (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Wsrun.toml` in the workspace root, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WSRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the execution plan without running anything.
    #[arg(long)]
    pub dry_run: bool,
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

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
