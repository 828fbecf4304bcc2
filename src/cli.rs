// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `retrig`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "retrig",
    version,
    about = "Re-run named commands when watched files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Retrig.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Retrig.toml")]
    pub config: String,

    /// Watch only the named `[watch.<name>]` target instead of all of them.
    #[arg(long, value_name = "NAME")]
    pub target: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RETRIG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print commands and watch targets, but don't watch
    /// or execute anything.
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
