//! # Indexer Export Validation
//!
//! Drives the `validate` subcommand handlers over export files written to a
//! temporary directory.

use ebr_cli::config::CliConfig;
use ebr_cli::validate::{collect_exports, load_export, run_validate, validate_export, ValidateArgs};
use ebr_core::{sha256, sha256_concat, Address, Hash32};
use ebr_crypto::AmountEncoding;
use ebr_recorder::RecorderRegistry;
use serde_json::json;

fn receiver() -> Address {
    "0xf17f52151EbEF6C7334FAD080c5704D77216b732".parse().unwrap()
}

/// A two-receipt export: leaves L0 and L1 under `sha256(L0 || L1)`.
fn two_receipt_export(encoding: AmountEncoding) -> serde_json::Value {
    let amounts = [100_000_000u128, 50_000_000];
    let uids: Vec<Hash32> = (0u64..2).map(|i| sha256(&i.to_le_bytes())).collect();
    let leaves: Vec<Hash32> = (0..2)
        .map(|i| {
            encoding
                .leaf_hash(amounts[i], &uids[i], &receiver())
                .unwrap()
                .leaf_hash
        })
        .collect();
    let root = sha256_concat(&[leaves[0].as_bytes(), leaves[1].as_bytes()]);

    json!({
        "root": root.to_string(),
        "receipts": [
            {
                "receipt_amount": amounts[0].to_string(),
                "receipt_index_hash": uids[0].to_hex(),
                "receipt_target_address": receiver().to_string(),
                "receipt_index": 0,
                "receipts_path": {
                    "receipt_path_hash": [leaves[1].to_string()],
                    "receipt_path_isLeft": [false]
                }
            },
            {
                "receipt_amount": 50_000_000u64,
                "receipt_index_hash": uids[1].to_string(),
                "receipt_target_address": receiver().to_string(),
                "receipt_index": "1",
                "receipts_path": {
                    "receipt_path_hash": [leaves[0].to_hex()],
                    "receipt_path_isLeft": [true]
                }
            }
        ]
    })
}

#[test]
fn directory_of_valid_exports_passes() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["batch-0.json", "batch-1.json"] {
        std::fs::write(
            dir.path().join(name),
            two_receipt_export(AmountEncoding::default()).to_string(),
        )
        .unwrap();
    }
    let args = ValidateArgs {
        paths: vec![dir.path().to_path_buf()],
        batch_size: None,
    };
    assert_eq!(run_validate(&args, &CliConfig::default()).unwrap(), 0);
}

#[test]
fn encoding_mismatch_fails_every_receipt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("be.json");
    std::fs::write(&path, two_receipt_export(AmountEncoding::new(32, true)).to_string()).unwrap();

    let export = load_export(&path).unwrap();
    let registry = RecorderRegistry::new();
    let report =
        validate_export(&registry, &path, &export, 1024, AmountEncoding::default()).unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.failures.len(), 2);

    let matching = CliConfig {
        batch_size: 1024,
        encoding: AmountEncoding::new(32, true),
    };
    let args = ValidateArgs {
        paths: vec![path],
        batch_size: Some(2),
    };
    assert_eq!(run_validate(&args, &matching).unwrap(), 0);
}

#[test]
fn malformed_export_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"root": "0x00", "receipts": []}"#).unwrap();
    assert!(load_export(&path).is_err());
    let files = collect_exports(&[path.clone()]).unwrap();
    assert_eq!(files, vec![path]);
}
