//! # Error Types
//!
//! Top-level error type for parsing the foundational types. Component
//! crates define their own `thiserror` enums for state machine rejections;
//! this one covers malformed input only.

use thiserror::Error;

/// Top-level error type for ebridge primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Hex input did not decode to the expected byte width.
    #[error("integrity error: {0}")]
    Integrity(String),
}
