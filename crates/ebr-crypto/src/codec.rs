//! # Receipt Leaf Hashing
//!
//! Encodes a source-chain amount into the fixed-width byte string the
//! indexer hashes, and derives the receipt leaf hash:
//!
//! ```text
//! hash_from_amount  = SHA256(encode(amount, width, order) || receipt_index_id)
//! hash_from_address = SHA256(target_address)            // 20 raw bytes
//! leaf_hash         = SHA256(hash_from_amount || hash_from_address)
//! ```
//!
//! All three values are returned so that a failing proof can be diagnosed
//! stage by stage against the indexer's own output.

use serde::{Deserialize, Serialize};

use ebr_core::{sha256, sha256_concat, Address, Amount, Hash32};

use crate::error::CodecError;

const AMOUNT_BYTES: usize = std::mem::size_of::<Amount>();

/// How source-chain amounts are laid out before hashing.
///
/// Fixed when a swap pair is created; must match the indexer's encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmountEncoding {
    /// Exact number of bytes the amount occupies.
    pub width_bytes: usize,
    /// Most significant byte first when `true`.
    pub big_endian: bool,
}

impl AmountEncoding {
    /// Create an encoding.
    pub const fn new(width_bytes: usize, big_endian: bool) -> Self {
        Self {
            width_bytes,
            big_endian,
        }
    }

    /// Encode `amount` with this layout.
    pub fn encode(&self, amount: Amount) -> Result<Vec<u8>, CodecError> {
        encode_amount(amount, self.width_bytes, self.big_endian)
    }

    /// Compute the receipt leaf hash with this layout.
    pub fn leaf_hash(
        &self,
        amount: Amount,
        receipt_index_id: &Hash32,
        target_address: &Address,
    ) -> Result<LeafHash, CodecError> {
        leaf_hash(
            amount,
            receipt_index_id,
            self.width_bytes,
            target_address,
            self.big_endian,
        )
    }
}

impl Default for AmountEncoding {
    /// Eight bytes, little-endian: the layout of a 64-bit source-chain amount.
    fn default() -> Self {
        Self::new(8, false)
    }
}

/// The intermediate and final hashes of a receipt leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafHash {
    /// `SHA256(encoded_amount || receipt_index_id)`.
    pub hash_from_amount: Hash32,
    /// `SHA256(target_address)`.
    pub hash_from_address: Hash32,
    /// `SHA256(hash_from_amount || hash_from_address)`.
    pub leaf_hash: Hash32,
}

/// Serialize `amount` into exactly `width_bytes` bytes.
///
/// Widths larger than the amount type are zero-padded on the most
/// significant side.
///
/// # Errors
///
/// Returns [`CodecError::EncodingOverflow`] if the amount has significant
/// bytes beyond `width_bytes`.
pub fn encode_amount(
    amount: Amount,
    width_bytes: usize,
    big_endian: bool,
) -> Result<Vec<u8>, CodecError> {
    let significant = AMOUNT_BYTES - (amount.leading_zeros() as usize / 8);
    if significant > width_bytes {
        return Err(CodecError::EncodingOverflow {
            amount,
            width_bytes,
        });
    }

    let le = amount.to_le_bytes();
    let mut out = vec![0u8; width_bytes];
    let copied = width_bytes.min(AMOUNT_BYTES);
    out[..copied].copy_from_slice(&le[..copied]);
    if big_endian {
        out.reverse();
    }
    Ok(out)
}

/// Compute the receipt leaf hash and its two intermediate hashes.
///
/// # Errors
///
/// Propagates [`CodecError::EncodingOverflow`] from [`encode_amount`].
pub fn leaf_hash(
    amount: Amount,
    receipt_index_id: &Hash32,
    width_bytes: usize,
    target_address: &Address,
    big_endian: bool,
) -> Result<LeafHash, CodecError> {
    let encoded = encode_amount(amount, width_bytes, big_endian)?;
    let hash_from_amount = sha256_concat(&[&encoded, receipt_index_id.as_bytes()]);
    let hash_from_address = sha256(target_address.as_bytes());
    let leaf_hash = sha256_concat(&[hash_from_amount.as_bytes(), hash_from_address.as_bytes()]);
    Ok(LeafHash {
        hash_from_amount,
        hash_from_address,
        leaf_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn receiver() -> Address {
        Address::from_hex("0xf17f52151EbEF6C7334FAD080c5704D77216b732").unwrap()
    }

    /// Receipt index hash of receipt 0: `sha256(0u64.to_le_bytes())`.
    fn receipt_zero() -> Hash32 {
        Hash32::from_hex("af5570f5a1810b7af78caf4bc70a660f0df51e42baf91d4de5b2328de0e83dfc")
            .unwrap()
    }

    #[test]
    fn encode_little_endian_eight_bytes() {
        let bytes = encode_amount(100_000_000, 8, false).unwrap();
        assert_eq!(bytes, vec![0x00, 0xe1, 0xf5, 0x05, 0, 0, 0, 0]);
    }

    #[test]
    fn encode_big_endian_eight_bytes() {
        let bytes = encode_amount(100_000_000, 8, true).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0x05, 0xf5, 0xe1, 0x00]);
    }

    #[test]
    fn encode_wide_pads_most_significant_side() {
        let le = encode_amount(1, 32, false).unwrap();
        assert_eq!(le.len(), 32);
        assert_eq!(le[0], 1);
        assert!(le[1..].iter().all(|b| *b == 0));

        let be = encode_amount(1, 32, true).unwrap();
        assert_eq!(be[31], 1);
        assert!(be[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn encode_overflow_rejected() {
        assert_eq!(
            encode_amount(256, 1, false),
            Err(CodecError::EncodingOverflow {
                amount: 256,
                width_bytes: 1
            })
        );
        assert!(encode_amount(u64::MAX as u128 + 1, 8, true).is_err());
        assert!(encode_amount(u64::MAX as u128, 8, true).is_ok());
    }

    #[test]
    fn encode_zero_width_only_fits_zero() {
        assert_eq!(encode_amount(0, 0, false).unwrap(), Vec::<u8>::new());
        assert!(encode_amount(1, 0, false).is_err());
    }

    #[test]
    fn leaf_hash_known_vector() {
        // Python:
        //   amt = (100000000).to_bytes(8, "little")
        //   ha = sha256(amt + uid); hb = sha256(addr); leaf = sha256(ha + hb)
        let h = leaf_hash(100_000_000, &receipt_zero(), 8, &receiver(), false).unwrap();
        assert_eq!(
            h.hash_from_amount.to_hex(),
            "ef594dd969e460e973fc326dd0e6bc246ad57d6898b8b01938594ba09cb1bba4"
        );
        assert_eq!(
            h.hash_from_address.to_hex(),
            "77e0f9b77297960d473f480186b79b959b29584eb6e4d3de03c1c0d62428703c"
        );
        assert_eq!(
            h.leaf_hash.to_hex(),
            "f67034ecf78a3122f620f32c0a93a07e2b22aaf66f8d278cfa7af97309401a6d"
        );
    }

    #[test]
    fn leaf_hash_big_endian_wide_vector() {
        let h = leaf_hash(100_000_000, &receipt_zero(), 32, &receiver(), true).unwrap();
        assert_eq!(
            h.leaf_hash.to_hex(),
            "41213fc522bba92dae763b5cddc788d17d9fb0479cc668ee67eada80835b0ea2"
        );
    }

    #[test]
    fn encoding_helper_matches_free_function() {
        let enc = AmountEncoding::default();
        assert_eq!(enc, AmountEncoding::new(8, false));
        assert_eq!(
            enc.leaf_hash(100_000_000, &receipt_zero(), &receiver()).unwrap(),
            leaf_hash(100_000_000, &receipt_zero(), 8, &receiver(), false).unwrap()
        );
    }

    #[test]
    fn leaf_hash_overflow_propagates() {
        assert!(leaf_hash(1 << 16, &receipt_zero(), 2, &receiver(), false).is_err());
    }

    proptest! {
        /// Encoded length always equals the requested width when it fits.
        #[test]
        fn encoded_length_is_width(amount in any::<u64>(), width in 8usize..40, be in any::<bool>()) {
            let bytes = encode_amount(amount as u128, width, be).unwrap();
            prop_assert_eq!(bytes.len(), width);
        }

        /// Both byte orders carry the same digits.
        #[test]
        fn byte_orders_are_mirrors(amount in any::<u64>(), width in 8usize..24) {
            let mut le = encode_amount(amount as u128, width, false).unwrap();
            let be = encode_amount(amount as u128, width, true).unwrap();
            le.reverse();
            prop_assert_eq!(le, be);
        }
    }
}
