//! # Recorder Error Types
//!
//! Every variant carries the recorder and the index arithmetic that caused
//! the rejection, so the admin process can correct its submission without
//! reading logs.

use ebr_core::{Address, LeafIndex, RecorderId};
use thiserror::Error;

/// Errors arising from recorder operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecorderError {
    /// Batch size must be strictly positive.
    #[error("invalid batch size {0}: must be greater than zero")]
    InvalidBatchSize(u64),

    /// No recorder is registered under this id.
    #[error("unknown {0}")]
    UnknownRecorder(RecorderId),

    /// The caller is not the recorder's admin.
    #[error("{caller} is not admin of {recorder_id}")]
    NotAdmin {
        /// The recorder being written.
        recorder_id: RecorderId,
        /// The rejected caller.
        caller: Address,
    },

    /// The index skips past a batch that has not been sealed.
    #[error("satisfied batch absent: {recorder_id} cannot record leaf {last_leaf_index} beyond {limit}")]
    SatisfiedBatchAbsent {
        /// The recorder being written.
        recorder_id: RecorderId,
        /// The requested last leaf index.
        last_leaf_index: LeafIndex,
        /// Highest index reachable from the current state.
        limit: LeafIndex,
    },

    /// The index shrinks the open batch or overruns its capacity.
    #[error("unable to record tree: {recorder_id} accepts last leaf in [{low}, {high}], got {last_leaf_index}")]
    UnableToRecordTree {
        /// The recorder being written.
        recorder_id: RecorderId,
        /// The requested last leaf index.
        last_leaf_index: LeafIndex,
        /// Lowest admissible index.
        low: LeafIndex,
        /// Highest admissible index. `LeafIndex::MAX` when the batch's
        /// capacity runs past the leaf space and nothing is admissible.
        high: LeafIndex,
    },

    /// No commitment at this position.
    #[error("{recorder_id} has no tree at index {tree_index} (from_satisfied: {from_satisfied})")]
    NotFound {
        /// The recorder queried.
        recorder_id: RecorderId,
        /// The requested tree position.
        tree_index: usize,
        /// Whether sealed history or the open slot was queried.
        from_satisfied: bool,
    },

    /// Nothing has been recorded yet.
    #[error("{0} has no commitments")]
    NoCommitments(RecorderId),

    /// No stored commitment covers the leaf.
    #[error("leaf {leaf_index} is not covered by any commitment of {recorder_id}")]
    LeafNotCommitted {
        /// The recorder queried.
        recorder_id: RecorderId,
        /// The uncovered leaf index.
        leaf_index: LeafIndex,
    },
}
