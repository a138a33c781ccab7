//! # Codec Error Types

use ebr_core::Amount;
use thiserror::Error;

/// Errors from amount encoding and proof-path assembly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The amount needs more bytes than the configured width.
    #[error("amount {amount} does not fit in {width_bytes} bytes")]
    EncodingOverflow {
        /// The amount that was being encoded.
        amount: Amount,
        /// The configured width.
        width_bytes: usize,
    },

    /// The sibling hashes and orientation flags have different lengths.
    #[error("merkle path has {hashes} hashes but {flags} orientation flags")]
    PathLengthMismatch {
        /// Number of sibling hashes supplied.
        hashes: usize,
        /// Number of orientation flags supplied.
        flags: usize,
    },
}
