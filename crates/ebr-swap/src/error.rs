//! # Swap Error Types
//!
//! Every variant names the pair and the leg or receipt involved. Collaborator
//! failures (codec, recorder, token ledger) are wrapped unchanged.

use ebr_core::{Address, Amount, Hash32, SwapId};
use ebr_crypto::CodecError;
use ebr_recorder::RecorderError;
use thiserror::Error;

use crate::token::TokenError;

/// Errors arising from swap registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// No swap pair is registered under this id.
    #[error("unknown {0}")]
    UnknownSwap(SwapId),

    /// The receipt was already redeemed against this pair.
    #[error("receipt {unique_id} already consumed by {swap_id}")]
    ReceiptAlreadyConsumed {
        /// The pair being redeemed.
        swap_id: SwapId,
        /// The replayed receipt identifier.
        unique_id: Hash32,
    },

    /// The merkle path does not lead to the committed root.
    #[error("invalid merkle proof for receipt {unique_id} at leaf {leaf_index}")]
    InvalidProof {
        /// The receipt identifier.
        unique_id: Hash32,
        /// The leaf index the proof was checked at.
        leaf_index: u64,
    },

    /// A conversion ratio has a zero share.
    #[error("invalid ratio {origin_share}:{target_share} for leg {leg}")]
    InvalidRatio {
        /// Position of the offending leg.
        leg: usize,
        /// Source-chain share.
        origin_share: Amount,
        /// Target-token share.
        target_share: Amount,
    },

    /// The leg description is malformed.
    #[error("invalid swap legs: {0}")]
    InvalidLegs(String),

    /// A leg's escrow cannot cover this release.
    #[error("insufficient deposit on {swap_id} for {token}: released {swapped} of {deposit}, requested {requested}")]
    InsufficientDeposit {
        /// The pair being redeemed.
        swap_id: SwapId,
        /// Target token of the leg.
        token: Address,
        /// Escrowed at creation.
        deposit: Amount,
        /// Already released.
        swapped: Amount,
        /// This redemption's release.
        requested: Amount,
    },

    /// Amount arithmetic overflowed.
    #[error("amount overflow converting {amount} for {token}")]
    AmountOverflow {
        /// The source amount being converted.
        amount: Amount,
        /// Target token of the leg.
        token: Address,
    },

    /// Leaf encoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The recorder rejected the lookup.
    #[error(transparent)]
    Recorder(#[from] RecorderError),

    /// The token ledger rejected the transfer batch.
    #[error(transparent)]
    Token(#[from] TokenError),
}
