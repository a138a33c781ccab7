//! # Recorder Registry
//!
//! Thread-safe registry of recorders, addressed by sequential [`RecorderId`].
//!
//! ## Locking
//!
//! The outer `RwLock` guards only the list of recorders and is write-locked
//! solely to push a new one. Each recorder sits behind its own `Mutex`, held
//! for the whole read-validate-mutate of a `record_batch` call. Events are
//! appended while the recorder lock is still held, so the event log orders
//! batches exactly as they were applied (lock order: recorder, then events).

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use ebr_core::{Address, BridgeEvent, EventKind, EventLog, Hash32, LeafIndex, RecorderId};
use ebr_crypto::PathNode;

use crate::batch::BatchCommitment;
use crate::error::RecorderError;
use crate::recorder::{RecordOutcome, Recorder, RecorderInfo};

/// The set of recorders hosted by one target ledger.
#[derive(Debug, Default)]
pub struct RecorderRegistry {
    recorders: RwLock<Vec<Arc<Mutex<Recorder>>>>,
    events: Mutex<EventLog>,
}

impl RecorderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn recorder(&self, recorder_id: RecorderId) -> Result<Arc<Mutex<Recorder>>, RecorderError> {
        let recorders = self.recorders.read();
        let found = recorder_id
            .index()
            .and_then(|index| recorders.get(index))
            .cloned();
        found.ok_or(RecorderError::UnknownRecorder(recorder_id))
    }

    /// Register a recorder owned by `admin`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::InvalidBatchSize`] if `batch_size` is zero.
    pub fn create_recorder(
        &self,
        admin: Address,
        batch_size: u64,
    ) -> Result<RecorderId, RecorderError> {
        let mut recorders = self.recorders.write();
        let recorder_id = RecorderId(recorders.len() as u64);
        let recorder = Recorder::new(recorder_id, admin, batch_size)?;
        recorders.push(Arc::new(Mutex::new(recorder)));

        self.events.lock().emit(EventKind::RecorderCreated {
            recorder_id,
            admin,
            batch_size,
        });
        tracing::info!(recorder_id = %recorder_id, admin = %admin, batch_size, "recorder created");
        Ok(recorder_id)
    }

    /// Record `root` for the batch ending at `last_leaf_index`.
    ///
    /// # Errors
    ///
    /// [`RecorderError::UnknownRecorder`], [`RecorderError::NotAdmin`],
    /// [`RecorderError::SatisfiedBatchAbsent`] or
    /// [`RecorderError::UnableToRecordTree`]. State is unchanged on error.
    pub fn record_batch(
        &self,
        caller: &Address,
        recorder_id: RecorderId,
        last_leaf_index: LeafIndex,
        root: Hash32,
    ) -> Result<RecordOutcome, RecorderError> {
        let recorder = self.recorder(recorder_id)?;
        let mut recorder = recorder.lock();

        let outcome = match recorder.record(caller, last_leaf_index, root) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(recorder_id = %recorder_id, caller = %caller, last_leaf_index, error = %err, "batch rejected");
                return Err(err);
            }
        };

        self.events.lock().emit(EventKind::BatchRecorded {
            recorder_id,
            last_leaf_index,
        });
        tracing::info!(recorder_id = %recorder_id, last_leaf_index, root = %root, outcome = ?outcome, "batch recorded");
        Ok(outcome)
    }

    /// Read a sealed batch or the open slot.
    ///
    /// # Errors
    ///
    /// [`RecorderError::UnknownRecorder`] or [`RecorderError::NotFound`].
    pub fn get_merkle_tree(
        &self,
        recorder_id: RecorderId,
        tree_index: usize,
        from_satisfied: bool,
    ) -> Result<BatchCommitment, RecorderError> {
        self.recorder(recorder_id)?
            .lock()
            .merkle_tree(tree_index, from_satisfied)
    }

    /// Highest leaf index recorded so far.
    ///
    /// # Errors
    ///
    /// [`RecorderError::UnknownRecorder`] or [`RecorderError::NoCommitments`].
    pub fn get_last_recorded_leaf_index(
        &self,
        recorder_id: RecorderId,
    ) -> Result<LeafIndex, RecorderError> {
        self.recorder(recorder_id)?.lock().last_recorded_leaf_index()
    }

    /// Verify `leaf` at `leaf_index` against the root of the batch covering it.
    ///
    /// # Errors
    ///
    /// [`RecorderError::UnknownRecorder`] or [`RecorderError::LeafNotCommitted`].
    /// An unverifiable path is `Ok(false)`, not an error.
    pub fn merkle_proof(
        &self,
        recorder_id: RecorderId,
        leaf_index: LeafIndex,
        leaf: &Hash32,
        path: &[PathNode],
    ) -> Result<bool, RecorderError> {
        let valid = self
            .recorder(recorder_id)?
            .lock()
            .merkle_proof(leaf_index, leaf, path)?;
        tracing::debug!(recorder_id = %recorder_id, leaf_index, leaf = %leaf, depth = path.len(), valid, "merkle proof checked");
        Ok(valid)
    }

    /// Number of registered recorders.
    pub fn recorder_count(&self) -> usize {
        self.recorders.read().len()
    }

    /// Number of sealed batches of a recorder.
    pub fn satisfied_count(&self, recorder_id: RecorderId) -> Result<usize, RecorderError> {
        Ok(self.recorder(recorder_id)?.lock().committed().len())
    }

    /// Admin and batch size of a recorder.
    pub fn recorder_info(&self, recorder_id: RecorderId) -> Result<RecorderInfo, RecorderError> {
        Ok(self.recorder(recorder_id)?.lock().info())
    }

    /// Snapshot of every event emitted so far.
    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events.lock().events().to_vec()
    }
}
