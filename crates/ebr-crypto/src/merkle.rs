//! # Merkle Path Verification
//!
//! Recomputes a root from a leaf and an oriented sibling path:
//!
//! ```text
//! acc = leaf
//! for (sibling, is_left) in path:
//!     acc = is_left ? SHA256(sibling || acc) : SHA256(acc || sibling)
//! valid = (acc == root)
//! ```
//!
//! `is_left` describes the *sibling*: `true` means the sibling sits to the
//! left of the running hash. Nodes are hashed without domain-separation
//! prefixes, matching the indexer's tree builder. An empty path proves a
//! single-leaf tree, where the leaf is the root.

use serde::{Deserialize, Serialize};

use ebr_core::{sha256_concat, Hash32};

use crate::error::CodecError;

/// One step of a merkle path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    /// The sibling hash at this level.
    pub sibling: Hash32,
    /// Whether the sibling is the left operand.
    pub is_left: bool,
}

impl PathNode {
    /// Sibling on the left of the running hash.
    pub const fn left(sibling: Hash32) -> Self {
        Self {
            sibling,
            is_left: true,
        }
    }

    /// Sibling on the right of the running hash.
    pub const fn right(sibling: Hash32) -> Self {
        Self {
            sibling,
            is_left: false,
        }
    }

    fn fold(&self, acc: &Hash32) -> Hash32 {
        if self.is_left {
            sha256_concat(&[self.sibling.as_bytes(), acc.as_bytes()])
        } else {
            sha256_concat(&[acc.as_bytes(), self.sibling.as_bytes()])
        }
    }
}

/// An ordered merkle path, leaf level first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerklePath(pub Vec<PathNode>);

impl MerklePath {
    /// Zip the indexer's parallel `hashes` / `is_left` arrays into a path.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::PathLengthMismatch`] if the arrays differ in length.
    pub fn from_parts(hashes: &[Hash32], is_left: &[bool]) -> Result<Self, CodecError> {
        if hashes.len() != is_left.len() {
            return Err(CodecError::PathLengthMismatch {
                hashes: hashes.len(),
                flags: is_left.len(),
            });
        }
        Ok(Self(
            hashes
                .iter()
                .zip(is_left)
                .map(|(sibling, is_left)| PathNode {
                    sibling: *sibling,
                    is_left: *is_left,
                })
                .collect(),
        ))
    }

    /// The path steps.
    pub fn nodes(&self) -> &[PathNode] {
        &self.0
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path proves a single-leaf tree.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fold `leaf` up `path` and return the resulting root.
pub fn compute_root(leaf: &Hash32, path: &[PathNode]) -> Hash32 {
    path.iter().fold(*leaf, |acc, node| node.fold(&acc))
}

/// Whether `path` proves `leaf` under `root`.
pub fn verify_path(leaf: &Hash32, root: &Hash32, path: &[PathNode]) -> bool {
    compute_root(leaf, path) == *root
}
