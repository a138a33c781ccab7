//! # ebridge CLI entry point
//!
//! Parses command-line arguments, loads the optional YAML configuration,
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ebr_cli::config::CliConfig;
use ebr_cli::leaf_hash::{run_leaf_hash, LeafHashArgs};
use ebr_cli::validate::{run_validate, ValidateArgs};

/// ebridge operator CLI
///
/// Recomputes receipt leaf hashes and replays indexer merkle exports through
/// the batch recorder to confirm every receipt is provable.
#[derive(Parser, Debug)]
#[command(name = "ebridge", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the amount, address and leaf hashes of one receipt.
    LeafHash(LeafHashArgs),

    /// Prove every receipt of one or more indexer exports.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "ebridge CLI starting");

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::LeafHash(args) => run_leaf_hash(&args, &config),
        Commands::Validate(args) => run_validate(&args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
