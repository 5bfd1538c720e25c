//! Command-line front end for data-driven loot tables.
//!
//! Run with: `loot <command>`. Logs go to stderr and follow `RUST_LOG`.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Dump, List, Roll};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

/// Roll, validate and inspect loot tables
#[derive(Parser)]
#[command(name = "loot")]
#[command(about = "Roll, validate and inspect loot tables", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate items from a table
    Roll(Roll),

    /// Load every table and verify it survives a canonical round trip
    Check(Check),

    /// Print a table in canonical JSON form
    Dump(Dump),

    /// List tables and registered converters
    List(List),
}

/// Filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "warn";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> Result<()> {
    // Load .env file if it exists (for LOOT_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::from_env();
    let cli = Cli::parse();

    match cli.command {
        Command::Roll(cmd) => cmd.execute(&config),
        Command::Check(cmd) => cmd.execute(&config),
        Command::Dump(cmd) => cmd.execute(&config),
        Command::List(cmd) => cmd.execute(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_parses() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
