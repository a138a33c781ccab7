//! # Conversion Ratios
//!
//! A swap leg converts source-chain amounts into target-token amounts at a
//! fixed integer ratio `target_share / origin_share`.
//!
//! ## Security Invariant
//!
//! Conversion is floor division. Fractional remainders are dropped and never
//! rounded up, so the sum of released amounts can never exceed what the
//! exact ratio would allow.

use serde::{Deserialize, Serialize};

use crate::identity::Amount;

/// A fixed conversion ratio between a source-chain amount and a target token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapRatio {
    /// Units of the source-chain token.
    #[serde(with = "crate::decimal")]
    pub origin_share: Amount,
    /// Units of the target token released per `origin_share`.
    #[serde(with = "crate::decimal")]
    pub target_share: Amount,
}

impl SwapRatio {
    /// Create a ratio. Validity is checked separately by [`is_valid`](Self::is_valid).
    pub const fn new(origin_share: Amount, target_share: Amount) -> Self {
        Self {
            origin_share,
            target_share,
        }
    }

    /// Both shares must be strictly positive.
    pub fn is_valid(&self) -> bool {
        self.origin_share > 0 && self.target_share > 0
    }

    /// `floor(amount * target_share / origin_share)`.
    ///
    /// Returns `None` if the intermediate product overflows or the ratio is
    /// invalid.
    pub fn convert(&self, amount: Amount) -> Option<Amount> {
        if !self.is_valid() {
            return None;
        }
        amount
            .checked_mul(self.target_share)
            .map(|product| product / self.origin_share)
    }
}

impl std::fmt::Display for SwapRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.origin_share, self.target_share)
    }
}
