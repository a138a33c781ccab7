//! # Identity Newtypes
//!
//! Newtype wrappers for account identities and ledger identifiers. These
//! prevent identifier confusion: a `RecorderId` cannot be passed where a
//! `SwapId` is expected, and a token address is never mistaken for a digest.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::{decode_fixed, sha256_concat, Hash32};
use crate::error::BridgeError;

/// Token amounts in the smallest unit. Always non-negative.
pub type Amount = u128;

/// Position of a leaf in a recorder's leaf-index space.
pub type LeafIndex = u64;

/// A 20-byte account identity (admins, receivers, token contracts, escrow).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Create an address from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, BridgeError> {
        decode_fixed::<20>(s).map(Self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Identifier of a recorder, assigned sequentially from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecorderId(pub u64);

impl RecorderId {
    /// Position of this recorder in the registry, or `None` if the id does
    /// not fit the platform's `usize`.
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for RecorderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recorder:{}", self.0)
    }
}

/// Identifier of a swap pair.
///
/// Derived as `sha256(recorder_id_le8 || creator || sequence_le8)`, where
/// `sequence` is the registry-wide creation counter. Unique within one
/// registry because the counter never repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwapId(pub Hash32);

impl SwapId {
    /// Derive the identifier for the `sequence`-th pair of a registry.
    pub fn derive(recorder_id: RecorderId, creator: &Address, sequence: u64) -> Self {
        Self(sha256_concat(&[
            &recorder_id.0.to_le_bytes(),
            creator.as_bytes(),
            &sequence.to_le_bytes(),
        ]))
    }

    /// Access the underlying digest.
    pub fn as_hash(&self) -> &Hash32 {
        &self.0
    }
}

impl fmt::Display for SwapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "swap:{}", self.0)
    }
}
