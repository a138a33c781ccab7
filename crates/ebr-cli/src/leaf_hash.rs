//! # Leaf-Hash Subcommand
//!
//! Prints the three hashes of one receipt leaf as JSON, so a mismatch with
//! the indexer can be traced to the amount or the address stage.

use anyhow::{Context, Result};
use clap::Args;

use ebr_core::{Address, Amount, Hash32};
use ebr_crypto::{AmountEncoding, LeafHash};

use crate::config::CliConfig;

/// Arguments for the `ebridge leaf-hash` subcommand.
#[derive(Args, Debug)]
pub struct LeafHashArgs {
    /// Source-chain amount in its smallest unit.
    #[arg(long)]
    pub amount: Amount,

    /// Receipt index hash (uniqueId), hex.
    #[arg(long)]
    pub unique_id: Hash32,

    /// Receiver address on the target ledger, hex.
    #[arg(long)]
    pub receiver: Address,

    /// Encoded amount width in bytes. Overrides the config file.
    #[arg(long)]
    pub width: Option<usize>,

    /// Encode the amount most significant byte first. A bare flag means
    /// `true`; `--big-endian false` switches a big-endian config back.
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub big_endian: Option<bool>,
}

impl LeafHashArgs {
    /// Effective encoding after applying flags over `config`.
    pub fn encoding(&self, config: &CliConfig) -> AmountEncoding {
        AmountEncoding::new(
            self.width.unwrap_or(config.encoding.width_bytes),
            self.big_endian.unwrap_or(config.encoding.big_endian),
        )
    }
}

/// Compute the receipt's leaf hashes.
pub fn compute(args: &LeafHashArgs, config: &CliConfig) -> Result<LeafHash> {
    let encoding = args.encoding(config);
    encoding
        .leaf_hash(args.amount, &args.unique_id, &args.receiver)
        .with_context(|| format!("cannot encode amount with {} bytes", encoding.width_bytes))
}

/// Execute the leaf-hash subcommand.
///
/// Returns exit code 0; encoding failures are returned as errors.
pub fn run_leaf_hash(args: &LeafHashArgs, config: &CliConfig) -> Result<u8> {
    let hashes = compute(args, config)?;
    println!("{}", serde_json::to_string_pretty(&hashes)?);
    Ok(0)
}
