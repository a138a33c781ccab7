//! # Batch Commitments

use serde::{Deserialize, Serialize};

use ebr_core::{Hash32, LeafIndex};

/// The latest root committed for a contiguous range of leaf indices.
///
/// Mutable only while it is the recorder's open batch; immutable once
/// sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCommitment {
    /// First leaf index covered.
    pub first_leaf_index: LeafIndex,
    /// Last leaf index covered (inclusive).
    pub last_leaf_index: LeafIndex,
    /// Merkle root over `[first_leaf_index, last_leaf_index]`.
    pub root: Hash32,
}

impl BatchCommitment {
    /// Whether `leaf_index` lies in this commitment's range.
    pub fn covers(&self, leaf_index: LeafIndex) -> bool {
        (self.first_leaf_index..=self.last_leaf_index).contains(&leaf_index)
    }

    /// Number of leaves covered.
    pub fn leaf_count(&self) -> u64 {
        self.last_leaf_index - self.first_leaf_index + 1
    }
}
