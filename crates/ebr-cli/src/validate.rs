//! # Validate Subcommand
//!
//! Replays indexer exports through the recorder. For each export file a new
//! recorder is registered, the export's root is recorded at
//! `batch_size - 1` (sealing batch 0), and every receipt's leaf is
//! recomputed and proven against it.
//!
//! An export has the shape:
//!
//! ```json
//! {
//!   "root": "0x…",
//!   "receipts": [{
//!     "receipt_amount": 100000000,
//!     "receipt_index_hash": "0x…",
//!     "receipt_target_address": "0x…",
//!     "receipt_index": 0,
//!     "receipts_path": {
//!       "receipt_path_hash": ["0x…"],
//!       "receipt_path_isLeft": [false]
//!     }
//!   }]
//! }
//! ```
//!
//! Amounts and indices are accepted as JSON numbers or decimal strings.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Deserializer};

use ebr_core::{Address, Amount, Hash32, LeafIndex, RecorderId};
use ebr_crypto::{AmountEncoding, MerklePath};
use ebr_recorder::RecorderRegistry;

use crate::config::CliConfig;

/// Admin identity of the recorders created during validation.
pub const VALIDATOR_ADMIN: Address = Address::new([0u8; 20]);

/// Arguments for the `ebridge validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Export files, or directories whose `*.json` files are exports.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Recorder capacity. Overrides the config file.
    #[arg(long)]
    pub batch_size: Option<u64>,
}

/// One indexer export.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerExport {
    /// Root over the export's receipts.
    pub root: Hash32,
    /// Receipts with their paths.
    pub receipts: Vec<IndexerReceipt>,
}

/// One receipt of an indexer export.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerReceipt {
    #[serde(deserialize_with = "number_or_string")]
    pub receipt_amount: Amount,
    pub receipt_index_hash: Hash32,
    pub receipt_target_address: Address,
    #[serde(deserialize_with = "number_or_string")]
    pub receipt_index: LeafIndex,
    pub receipts_path: IndexerPath,
}

/// Parallel sibling/orientation arrays of a receipt path.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerPath {
    pub receipt_path_hash: Vec<Hash32>,
    #[serde(rename = "receipt_path_isLeft")]
    pub receipt_path_is_left: Vec<bool>,
}

fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(n) => T::try_from(n).map_err(|_| serde::de::Error::custom("number out of range")),
        Repr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A receipt that did not verify, with the hashes needed to diagnose it.
#[derive(Debug, Clone)]
pub struct ReceiptFailure {
    /// Position of the receipt in the export.
    pub position: usize,
    /// The receipt's leaf index.
    pub receipt_index: LeafIndex,
    /// Why it failed.
    pub reason: String,
    /// `SHA256(amount || uid)`, when the amount could be encoded.
    pub hash_from_amount: Option<Hash32>,
    /// `SHA256(address)`, when the amount could be encoded.
    pub hash_from_address: Option<Hash32>,
    /// Recomputed leaf, when the amount could be encoded.
    pub leaf_hash: Option<Hash32>,
}

/// Outcome of validating one export file.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// The export file.
    pub path: PathBuf,
    /// Recorder registered for it.
    pub recorder_id: RecorderId,
    /// Root recorded.
    pub root: Hash32,
    /// Number of receipts checked.
    pub total: usize,
    /// Receipts that did not verify.
    pub failures: Vec<ReceiptFailure>,
}

impl FileReport {
    /// Whether every receipt verified.
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Expand directories into their `*.json` files, sorted by name.
pub fn collect_exports(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            entries.sort();
            files.extend(entries);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("export not found: {}", path.display());
        }
    }
    Ok(files)
}

/// Parse an export file.
pub fn load_export(path: &Path) -> Result<IndexerExport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read export: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse export JSON: {}", path.display()))
}

/// Register a recorder for `export`, record its root, and prove every receipt.
pub fn validate_export(
    registry: &RecorderRegistry,
    path: &Path,
    export: &IndexerExport,
    batch_size: u64,
    encoding: AmountEncoding,
) -> Result<FileReport> {
    let recorder_id = registry.create_recorder(VALIDATOR_ADMIN, batch_size)?;
    registry.record_batch(&VALIDATOR_ADMIN, recorder_id, batch_size - 1, export.root)?;

    let failures = export
        .receipts
        .iter()
        .enumerate()
        .filter_map(|(position, receipt)| {
            check_receipt(registry, recorder_id, encoding, receipt)
                .err()
                .map(|mut failure| {
                    failure.position = position;
                    failure
                })
        })
        .collect();

    Ok(FileReport {
        path: path.to_path_buf(),
        recorder_id,
        root: export.root,
        total: export.receipts.len(),
        failures,
    })
}

fn check_receipt(
    registry: &RecorderRegistry,
    recorder_id: RecorderId,
    encoding: AmountEncoding,
    receipt: &IndexerReceipt,
) -> Result<(), ReceiptFailure> {
    let failure = |reason: String| ReceiptFailure {
        position: 0,
        receipt_index: receipt.receipt_index,
        reason,
        hash_from_amount: None,
        hash_from_address: None,
        leaf_hash: None,
    };

    let hashes = encoding
        .leaf_hash(
            receipt.receipt_amount,
            &receipt.receipt_index_hash,
            &receipt.receipt_target_address,
        )
        .map_err(|e| failure(e.to_string()))?;
    let with_hashes = |reason: String| ReceiptFailure {
        hash_from_amount: Some(hashes.hash_from_amount),
        hash_from_address: Some(hashes.hash_from_address),
        leaf_hash: Some(hashes.leaf_hash),
        ..failure(reason)
    };

    let path = MerklePath::from_parts(
        &receipt.receipts_path.receipt_path_hash,
        &receipt.receipts_path.receipt_path_is_left,
    )
    .map_err(|e| with_hashes(e.to_string()))?;

    match registry.merkle_proof(
        recorder_id,
        receipt.receipt_index,
        &hashes.leaf_hash,
        path.nodes(),
    ) {
        Ok(true) => Ok(()),
        Ok(false) => Err(with_hashes("merkle proof does not match root".into())),
        Err(e) => Err(with_hashes(e.to_string())),
    }
}

fn print_report(report: &FileReport) {
    println!(
        "{}: {}/{} receipts verified ({})",
        report.path.display(),
        report.total - report.failures.len(),
        report.total,
        report.recorder_id
    );
    for failure in &report.failures {
        println!(
            "  FAIL: receipt #{} (index {}): {}",
            failure.position, failure.receipt_index, failure.reason
        );
        println!("    tree root:    {}", report.root);
        if let (Some(amount), Some(address), Some(leaf)) = (
            failure.hash_from_amount,
            failure.hash_from_address,
            failure.leaf_hash,
        ) {
            println!("    amount hash:  {amount}");
            println!("    address hash: {address}");
            println!("    leaf hash:    {leaf}");
        }
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every receipt verifies, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    let batch_size = args.batch_size.unwrap_or(config.batch_size);
    if batch_size == 0 {
        bail!("batch size must be greater than zero");
    }

    let files = collect_exports(&args.paths)?;
    if files.is_empty() {
        println!("No export files found.");
        return Ok(1);
    }

    let registry = RecorderRegistry::new();
    let mut failed_files = 0usize;
    for file in &files {
        let export = load_export(file)?;
        let report = validate_export(&registry, file, &export, batch_size, config.encoding)?;
        tracing::info!(path = %file.display(), total = report.total, failed = report.failures.len(), "export validated");
        print_report(&report);
        if !report.passed() {
            failed_files += 1;
        }
    }

    if failed_files > 0 {
        println!(
            "\n{} of {} export(s) had unverifiable receipts.",
            failed_files,
            files.len()
        );
        Ok(1)
    } else {
        Ok(0)
    }
}
