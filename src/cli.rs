//! Command-line interface definitions.

use std::path::PathBuf;

use clap::Parser;

/// Livebook - live betting-market tracking and order-book recording.
#[derive(Parser, Debug)]
#[command(name = "livebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}
