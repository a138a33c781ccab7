//! # Ledger Events
//!
//! Records emitted by the recorder and swap registries for external
//! observers and indexers. Each registry owns an [`EventLog`] and stamps
//! events with a sequence number in the order its operations completed.
//!
//! Amounts serialize as decimal strings (see [`crate::decimal`]).

use serde::{Deserialize, Serialize};

use crate::digest::Hash32;
use crate::identity::{Address, Amount, LeafIndex, RecorderId, SwapId};
use crate::ratio::SwapRatio;

/// The payload of a ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    /// A recorder was registered.
    RecorderCreated {
        recorder_id: RecorderId,
        admin: Address,
        batch_size: u64,
    },
    /// A root was accepted for the batch ending at `last_leaf_index`.
    BatchRecorded {
        recorder_id: RecorderId,
        last_leaf_index: LeafIndex,
    },
    /// A swap pair was created and its deposits escrowed.
    SwapPairCreated {
        swap_id: SwapId,
        recorder_id: RecorderId,
        tokens: Vec<Address>,
        #[serde(with = "crate::decimal::vec")]
        deposit_amounts: Vec<Amount>,
        ratios: Vec<SwapRatio>,
    },
    /// A receipt was redeemed against a swap pair.
    TokenSwapped {
        swap_id: SwapId,
        receiver: Address,
        unique_id: Hash32,
        #[serde(with = "crate::decimal")]
        swap_amount: Amount,
        #[serde(with = "crate::decimal::vec")]
        released: Vec<Amount>,
    },
}

/// A sequenced ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// Position of this event in its registry's log, starting at 0.
    pub sequence: u64,
    /// Event payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Append-only event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<BridgeEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number.
    pub fn emit(&mut self, kind: EventKind) -> u64 {
        let sequence = self.events.len() as u64;
        self.events.push(BridgeEvent { sequence, kind });
        sequence
    }

    /// All events in emission order.
    pub fn events(&self) -> &[BridgeEvent] {
        &self.events
    }

    /// Number of events emitted.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event has been emitted.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
