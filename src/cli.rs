// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `dagrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagrun",
    version,
    about = "Run shell tasks in dependency order with a bounded worker pool.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Number of concurrent workers (overrides `[config].threads`).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: Option<u16>,

    /// How node status is reported while the graph runs.
    #[arg(long, value_enum, value_name = "MODE", default_value_t = ReportMode::Console)]
    pub report: ReportMode,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the execution order, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Status reporter selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    /// Table of node states on stderr after every change.
    Console,
    /// Node states as debug-level log events.
    Log,
    /// No status output.
    None,
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
