//! # Swap Registry
//!
//! Creates escrowed swap pairs and redeems proven receipts against them.
//!
//! ## Redemption Order
//!
//! ```text
//! lock pair
//!   1. unknown pair          -> UnknownSwap
//!   2. unique_id consumed    -> ReceiptAlreadyConsumed
//!   3. leaf = leaf_hash(amount, unique_id, encoding, receiver)
//!   4. recorder proof false  -> InvalidProof
//!   5. plan per-leg release  -> InsufficientDeposit / AmountOverflow
//!   6. token batch           -> Token(..)
//!   7. consume + account
//! unlock pair
//! ```
//!
//! The pair lock is held from step 2 to step 7. The recorder is locked
//! briefly inside step 4 only; the recorder path never takes a pair lock.
//!
//! ## Creation
//!
//! `create_swap` reserves its sequence number under the registry write lock
//! and releases the lock before the escrow batch runs, so lookups on other
//! pairs never wait on the token ledger. The pair becomes visible only after
//! its deposits landed. A creation whose escrow batch fails burns its
//! sequence number; ids stay unique.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use ebr_core::{
    Address, Amount, BridgeEvent, EventKind, EventLog, Hash32, RecorderId, SwapId, SwapRatio,
};
use ebr_crypto::{leaf_hash, AmountEncoding, LeafHash};
use ebr_recorder::RecorderRegistry;

use crate::error::SwapError;
use crate::pair::{ReceiptProof, SwapLeg, SwapPair};
use crate::token::{TokenLedger, TokenTransfer};

#[derive(Debug, Default)]
struct Pairs {
    by_id: HashMap<SwapId, Arc<Mutex<SwapPair>>>,
    next_sequence: u64,
}

/// Swap pairs hosted by one target ledger.
pub struct SwapRegistry {
    recorders: Arc<RecorderRegistry>,
    ledger: Arc<dyn TokenLedger>,
    escrow: Address,
    pairs: RwLock<Pairs>,
    events: Mutex<EventLog>,
}

impl std::fmt::Debug for SwapRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapRegistry")
            .field("escrow", &self.escrow)
            .field("pairs", &self.pairs.read().by_id.len())
            .finish_non_exhaustive()
    }
}

impl SwapRegistry {
    /// Create a registry verifying against `recorders` and holding escrow
    /// in `ledger` under the `escrow` account.
    pub fn new(
        recorders: Arc<RecorderRegistry>,
        ledger: Arc<dyn TokenLedger>,
        escrow: Address,
    ) -> Self {
        Self {
            recorders,
            ledger,
            escrow,
            pairs: RwLock::new(Pairs::default()),
            events: Mutex::new(EventLog::new()),
        }
    }

    /// The account holding every pair's deposits.
    pub fn escrow(&self) -> Address {
        self.escrow
    }

    /// The recorders receipts are proven against.
    pub fn recorders(&self) -> &Arc<RecorderRegistry> {
        &self.recorders
    }

    fn pair(&self, swap_id: &SwapId) -> Result<Arc<Mutex<SwapPair>>, SwapError> {
        self.pairs
            .read()
            .by_id
            .get(swap_id)
            .cloned()
            .ok_or(SwapError::UnknownSwap(*swap_id))
    }

    /// Register a swap pair and escrow its deposits from `caller`.
    ///
    /// `caller` must have approved the escrow account for every deposit.
    ///
    /// # Errors
    ///
    /// [`SwapError::InvalidLegs`], [`SwapError::InvalidRatio`], an unknown
    /// recorder, or the token ledger's rejection of the escrow batch. Nothing
    /// is registered or transferred on error.
    pub fn create_swap(
        &self,
        caller: &Address,
        recorder_id: RecorderId,
        origin_encoding: AmountEncoding,
        tokens: &[Address],
        deposit_amounts: &[Amount],
        ratios: &[SwapRatio],
    ) -> Result<SwapId, SwapError> {
        self.recorders.recorder_info(recorder_id)?;

        let (swap_id, pair) = {
            let mut pairs = self.pairs.write();
            let swap_id = SwapId::derive(recorder_id, caller, pairs.next_sequence);
            let pair = SwapPair::new(
                swap_id,
                recorder_id,
                origin_encoding,
                *caller,
                tokens,
                deposit_amounts,
                ratios,
            )?;
            pairs.next_sequence += 1;
            (swap_id, pair)
        };

        let escrow_batch: Vec<TokenTransfer> = pair
            .legs
            .iter()
            .map(|leg| TokenTransfer::TransferFrom {
                token: leg.token,
                spender: self.escrow,
                from: *caller,
                to: self.escrow,
                amount: leg.deposit_amount,
            })
            .collect();
        self.ledger.execute(&escrow_batch)?;

        self.pairs
            .write()
            .by_id
            .insert(swap_id, Arc::new(Mutex::new(pair)));

        self.events.lock().emit(EventKind::SwapPairCreated {
            swap_id,
            recorder_id,
            tokens: tokens.to_vec(),
            deposit_amounts: deposit_amounts.to_vec(),
            ratios: ratios.to_vec(),
        });
        tracing::info!(swap_id = %swap_id, recorder_id = %recorder_id, creator = %caller, legs = tokens.len(), "swap pair created");
        Ok(swap_id)
    }

    /// Redeem a proven receipt, releasing every leg's share to `receiver`.
    ///
    /// Returns the amount released per leg, in leg order.
    ///
    /// # Errors
    ///
    /// See the module docs for the order in which checks fail. Pair state
    /// and balances are unchanged on error.
    pub fn swap_token(
        &self,
        swap_id: &SwapId,
        swap_amount: Amount,
        receiver: &Address,
        proof: &ReceiptProof,
    ) -> Result<Vec<Amount>, SwapError> {
        let pair = self.pair(swap_id)?;
        let mut pair = pair.lock();

        if pair.is_consumed(&proof.unique_id) {
            tracing::warn!(swap_id = %swap_id, unique_id = %proof.unique_id, "receipt replay rejected");
            return Err(SwapError::ReceiptAlreadyConsumed {
                swap_id: *swap_id,
                unique_id: proof.unique_id,
            });
        }

        let leaf = pair
            .origin_encoding
            .leaf_hash(swap_amount, &proof.unique_id, receiver)?;
        let path = proof.path()?;
        let valid = self.recorders.merkle_proof(
            pair.recorder_id,
            proof.last_leaf_index,
            &leaf.leaf_hash,
            path.nodes(),
        )?;
        if !valid {
            tracing::warn!(swap_id = %swap_id, unique_id = %proof.unique_id, leaf = %leaf.leaf_hash, "receipt proof rejected");
            return Err(SwapError::InvalidProof {
                unique_id: proof.unique_id,
                leaf_index: proof.last_leaf_index,
            });
        }

        let released = pair.plan_release(swap_amount)?;
        let payout: Vec<TokenTransfer> = pair
            .legs
            .iter()
            .zip(&released)
            .map(|(leg, amount)| TokenTransfer::Transfer {
                token: leg.token,
                from: self.escrow,
                to: *receiver,
                amount: *amount,
            })
            .collect();
        self.ledger.execute(&payout)?;

        pair.commit_release(proof.unique_id, &released);

        self.events.lock().emit(EventKind::TokenSwapped {
            swap_id: *swap_id,
            receiver: *receiver,
            unique_id: proof.unique_id,
            swap_amount,
            released: released.clone(),
        });
        tracing::info!(swap_id = %swap_id, receiver = %receiver, unique_id = %proof.unique_id, swap_amount, "token swapped");
        Ok(released)
    }

    /// Snapshot of a swap pair.
    pub fn swap_pair(&self, swap_id: &SwapId) -> Result<SwapPair, SwapError> {
        Ok(self.pair(swap_id)?.lock().clone())
    }

    /// Snapshot of the leg paying out `token`, if the pair has one.
    pub fn swap_leg(&self, swap_id: &SwapId, token: &Address) -> Result<Option<SwapLeg>, SwapError> {
        Ok(self.pair(swap_id)?.lock().leg(token).copied())
    }

    /// Whether `unique_id` was already redeemed against the pair.
    pub fn is_consumed(&self, swap_id: &SwapId, unique_id: &Hash32) -> Result<bool, SwapError> {
        Ok(self.pair(swap_id)?.lock().is_consumed(unique_id))
    }

    /// Number of registered pairs.
    pub fn swap_count(&self) -> usize {
        self.pairs.read().by_id.len()
    }

    /// Leaf hash of a receipt with an explicit encoding, for diagnostics.
    pub fn compute_leaf_hash(
        &self,
        amount: Amount,
        unique_id: &Hash32,
        width_bytes: usize,
        receiver: &Address,
        big_endian: bool,
    ) -> Result<LeafHash, SwapError> {
        Ok(leaf_hash(amount, unique_id, width_bytes, receiver, big_endian)?)
    }

    /// Snapshot of every event emitted so far.
    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events.lock().events().to_vec()
    }
}
