//! # Swap Pairs
//!
//! A swap pair binds one recorder to a set of escrowed target tokens
//! ("legs"), each with its own conversion ratio. Redemption is split into a
//! pure planning step ([`SwapPair::plan_release`]) and a commit step
//! ([`SwapPair::commit_release`]), so the registry can run the token batch
//! in between and commit only on success.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use ebr_core::{Address, Amount, Hash32, LeafIndex, RecorderId, SwapId, SwapRatio};
use ebr_crypto::{AmountEncoding, CodecError, MerklePath};

use crate::error::SwapError;

/// One escrowed target token of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLeg {
    /// Target token contract.
    pub token: Address,
    /// Conversion from source amount to this token.
    pub ratio: SwapRatio,
    /// Escrowed at creation. Never changes.
    #[serde(with = "ebr_core::decimal")]
    pub deposit_amount: Amount,
    /// Released so far. Never exceeds `deposit_amount`.
    #[serde(with = "ebr_core::decimal")]
    pub swapped_amount: Amount,
    /// Number of successful redemptions.
    pub swapped_times: u64,
}

impl SwapLeg {
    /// Escrow not yet released.
    pub fn remaining(&self) -> Amount {
        self.deposit_amount - self.swapped_amount
    }
}

/// A receipt and its inclusion proof, as exported by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptProof {
    /// Leaf index of the receipt in the recorder's leaf space.
    pub last_leaf_index: LeafIndex,
    /// Receipt identifier; also the replay key.
    pub unique_id: Hash32,
    /// Sibling hashes, leaf level first.
    pub merkle_tree_path: Vec<Hash32>,
    /// Orientation of each sibling.
    pub is_left_node: Vec<bool>,
}

impl ReceiptProof {
    /// Zip siblings and flags into a verifiable path.
    pub fn path(&self) -> Result<MerklePath, CodecError> {
        MerklePath::from_parts(&self.merkle_tree_path, &self.is_left_node)
    }
}

/// A registered swap pair and its accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapPair {
    /// Pair identifier.
    pub id: SwapId,
    /// Recorder whose roots prove receipts for this pair.
    pub recorder_id: RecorderId,
    /// How source amounts are laid out in receipt leaves.
    pub origin_encoding: AmountEncoding,
    /// Account that funded the escrow.
    pub creator: Address,
    /// Escrowed legs in creation order.
    pub legs: Vec<SwapLeg>,
    consumed: HashSet<Hash32>,
}

impl SwapPair {
    /// Build a pair with fresh legs after validating the leg description.
    ///
    /// # Errors
    ///
    /// [`SwapError::InvalidLegs`] for mismatched or empty lists and repeated
    /// tokens, [`SwapError::InvalidRatio`] for a zero share.
    pub fn new(
        id: SwapId,
        recorder_id: RecorderId,
        origin_encoding: AmountEncoding,
        creator: Address,
        tokens: &[Address],
        deposit_amounts: &[Amount],
        ratios: &[SwapRatio],
    ) -> Result<Self, SwapError> {
        if tokens.is_empty() {
            return Err(SwapError::InvalidLegs("at least one token is required".into()));
        }
        if tokens.len() != deposit_amounts.len() || tokens.len() != ratios.len() {
            return Err(SwapError::InvalidLegs(format!(
                "{} tokens, {} deposits, {} ratios",
                tokens.len(),
                deposit_amounts.len(),
                ratios.len()
            )));
        }

        let mut seen = HashSet::new();
        let mut legs = Vec::with_capacity(tokens.len());
        for (leg, ((token, deposit_amount), ratio)) in
            tokens.iter().zip(deposit_amounts).zip(ratios).enumerate()
        {
            if !ratio.is_valid() {
                return Err(SwapError::InvalidRatio {
                    leg,
                    origin_share: ratio.origin_share,
                    target_share: ratio.target_share,
                });
            }
            if !seen.insert(*token) {
                return Err(SwapError::InvalidLegs(format!("token {token} repeated")));
            }
            legs.push(SwapLeg {
                token: *token,
                ratio: *ratio,
                deposit_amount: *deposit_amount,
                swapped_amount: 0,
                swapped_times: 0,
            });
        }

        Ok(Self {
            id,
            recorder_id,
            origin_encoding,
            creator,
            legs,
            consumed: HashSet::new(),
        })
    }

    /// The leg paying out `token`.
    pub fn leg(&self, token: &Address) -> Option<&SwapLeg> {
        self.legs.iter().find(|leg| leg.token == *token)
    }

    /// Whether `unique_id` was already redeemed against this pair.
    pub fn is_consumed(&self, unique_id: &Hash32) -> bool {
        self.consumed.contains(unique_id)
    }

    /// Number of redeemed receipts.
    pub fn consumed_count(&self) -> usize {
        self.consumed.len()
    }

    /// Amount each leg would release for `swap_amount`, in leg order.
    ///
    /// # Errors
    ///
    /// [`SwapError::AmountOverflow`] if a conversion overflows,
    /// [`SwapError::InsufficientDeposit`] if any leg cannot cover its share.
    /// Exhausting a deposit exactly is allowed.
    pub fn plan_release(&self, swap_amount: Amount) -> Result<Vec<Amount>, SwapError> {
        self.legs
            .iter()
            .map(|leg| {
                let released = leg.ratio.convert(swap_amount).ok_or(SwapError::AmountOverflow {
                    amount: swap_amount,
                    token: leg.token,
                })?;
                if released > leg.remaining() {
                    return Err(SwapError::InsufficientDeposit {
                        swap_id: self.id,
                        token: leg.token,
                        deposit: leg.deposit_amount,
                        swapped: leg.swapped_amount,
                        requested: released,
                    });
                }
                Ok(released)
            })
            .collect()
    }

    /// Record a redemption planned by [`plan_release`](Self::plan_release).
    ///
    /// Must only be called with a plan produced against the current state;
    /// the amounts are then known to fit.
    pub(crate) fn commit_release(&mut self, unique_id: Hash32, released: &[Amount]) {
        self.consumed.insert(unique_id);
        for (leg, amount) in self.legs.iter_mut().zip(released) {
            leg.swapped_amount += amount;
            leg.swapped_times += 1;
        }
    }
}
