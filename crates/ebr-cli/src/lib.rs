//! # ebr-cli — CLI Tool for ebridge
//!
//! Provides the `ebridge` command-line interface used by operators to
//! cross-check the indexer against the on-ledger verification code.
//!
//! ## Subcommands
//!
//! - `ebridge leaf-hash`: print the intermediate and final leaf hashes of
//!   one receipt.
//! - `ebridge validate`: record each indexer export's root in a fresh
//!   recorder and prove every receipt it lists.
//!
//! ```bash
//! ebridge leaf-hash --amount 100000000 --unique-id 0xaf55... --receiver 0xf17f...
//! ebridge --config bridge.yaml validate exports/
//! ```

pub mod config;
pub mod leaf_hash;
pub mod validate;

pub use config::CliConfig;
