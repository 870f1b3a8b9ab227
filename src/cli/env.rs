use clap::Parser;
use std::path::PathBuf;

use super::commands::Commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Settings file path (YAML, TOML, JSON or INI)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level for engine tracing (ignored when RUST_LOG is set)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Shorthand for --log-level debug; shows every attempt, sleep and reload
    #[arg(short, long)]
    pub debug: bool,

    /// Output format for command results (logs always go to stderr)
    #[arg(short, long, default_value = "human")]
    pub output: crate::cli::output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}
