//! # Recorder State Machine
//!
//! A single recorder: its admin, its batch capacity, the sealed history and
//! the open batch. All admission arithmetic lives here; the registry only
//! adds locking, events and logging around it.
//!
//! ## Admission Rule
//!
//! Let `reference` be the open batch's last index, or `start - 1` when no
//! batch is open (`start` = one past the last sealed index, `0` initially).
//!
//! 1. `last > reference + batch_size` skips past a batch that was never
//!    sealed: [`RecorderError::SatisfiedBatchAbsent`].
//! 2. With an open batch `[f, l]`, `last` must lie in `[l, f + batch_size - 1]`.
//!    Without one, `last` must be at least `start`. Otherwise:
//!    [`RecorderError::UnableToRecordTree`].
//! 3. Reaching `first + batch_size - 1` seals the batch.

use serde::{Deserialize, Serialize};

use ebr_core::{Address, Hash32, LeafIndex, RecorderId};
use ebr_crypto::{verify_path, PathNode};

use crate::batch::BatchCommitment;
use crate::error::RecorderError;

/// What an accepted `record` call did to the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordOutcome {
    /// A new batch was opened and is still pending.
    Opened,
    /// The open batch's root was replaced and its range extended (or kept).
    Extended,
    /// The batch reached capacity and moved into sealed history.
    Sealed,
}

/// Static description of a recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderInfo {
    /// Recorder identifier.
    pub id: RecorderId,
    /// The only identity allowed to record batches.
    pub admin: Address,
    /// Leaves per sealed batch.
    pub batch_size: u64,
}

/// One batching ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recorder {
    info: RecorderInfo,
    committed: Vec<BatchCommitment>,
    pending: Option<BatchCommitment>,
}

impl Recorder {
    /// Create an empty recorder.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::InvalidBatchSize`] if `batch_size` is zero.
    pub fn new(id: RecorderId, admin: Address, batch_size: u64) -> Result<Self, RecorderError> {
        if batch_size == 0 {
            return Err(RecorderError::InvalidBatchSize(batch_size));
        }
        Ok(Self {
            info: RecorderInfo {
                id,
                admin,
                batch_size,
            },
            committed: Vec::new(),
            pending: None,
        })
    }

    /// Static description.
    pub fn info(&self) -> RecorderInfo {
        self.info
    }

    /// Sealed batches in sealing order.
    pub fn committed(&self) -> &[BatchCommitment] {
        &self.committed
    }

    /// The open batch, if any.
    pub fn pending(&self) -> Option<&BatchCommitment> {
        self.pending.as_ref()
    }

    /// First index of the next batch to open, or `None` once a sealed batch
    /// ends at `LeafIndex::MAX`.
    pub fn expected_start(&self) -> Option<LeafIndex> {
        match self.committed.last() {
            Some(sealed) => sealed.last_leaf_index.checked_add(1),
            None => Some(0),
        }
    }

    /// Record `root` as the latest commitment for the batch ending at
    /// `last_leaf_index`.
    ///
    /// On error the recorder is left unchanged.
    ///
    /// # Errors
    ///
    /// [`RecorderError::NotAdmin`], [`RecorderError::SatisfiedBatchAbsent`]
    /// or [`RecorderError::UnableToRecordTree`] per the admission rule.
    pub fn record(
        &mut self,
        caller: &Address,
        last_leaf_index: LeafIndex,
        root: Hash32,
    ) -> Result<RecordOutcome, RecorderError> {
        if *caller != self.info.admin {
            return Err(RecorderError::NotAdmin {
                recorder_id: self.info.id,
                caller: *caller,
            });
        }

        let (first_leaf_index, capacity_end) = self.admit(last_leaf_index)?;
        let opened = self.pending.is_none();

        let batch = BatchCommitment {
            first_leaf_index,
            last_leaf_index,
            root,
        };

        if last_leaf_index == capacity_end {
            self.pending = None;
            self.committed.push(batch);
            Ok(RecordOutcome::Sealed)
        } else {
            self.pending = Some(batch);
            Ok(if opened {
                RecordOutcome::Opened
            } else {
                RecordOutcome::Extended
            })
        }
    }

    /// Check `last_leaf_index` against the admission rule and return the
    /// first index and capacity end of the batch it belongs to.
    ///
    /// A batch whose capacity end does not fit in a [`LeafIndex`] admits
    /// nothing.
    fn admit(&self, last_leaf_index: LeafIndex) -> Result<(LeafIndex, LeafIndex), RecorderError> {
        let size = self.info.batch_size;
        let exhausted = |low: LeafIndex| RecorderError::UnableToRecordTree {
            recorder_id: self.info.id,
            last_leaf_index,
            low,
            high: LeafIndex::MAX,
        };
        let (first, low, limit) = match &self.pending {
            Some(open) => (
                open.first_leaf_index,
                open.last_leaf_index,
                open.last_leaf_index.checked_add(size),
            ),
            None => {
                let start = self
                    .expected_start()
                    .ok_or_else(|| exhausted(LeafIndex::MAX))?;
                (start, start, start.checked_add(size - 1))
            }
        };

        // Highest index reachable without skipping an unsealed batch. Past
        // the top of the leaf space nothing can be skipped.
        if let Some(limit) = limit.filter(|&limit| last_leaf_index > limit) {
            return Err(RecorderError::SatisfiedBatchAbsent {
                recorder_id: self.info.id,
                last_leaf_index,
                limit,
            });
        }
        let high = first.checked_add(size - 1).ok_or_else(|| exhausted(low))?;
        if last_leaf_index < low || last_leaf_index > high {
            return Err(RecorderError::UnableToRecordTree {
                recorder_id: self.info.id,
                last_leaf_index,
                low,
                high,
            });
        }
        Ok((first, high))
    }

    /// Look up a sealed batch (`from_satisfied`) or the open slot (index 0).
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::NotFound`] if nothing is stored there.
    pub fn merkle_tree(
        &self,
        tree_index: usize,
        from_satisfied: bool,
    ) -> Result<BatchCommitment, RecorderError> {
        let found = if from_satisfied {
            self.committed.get(tree_index)
        } else if tree_index == 0 {
            self.pending.as_ref()
        } else {
            None
        };
        found.copied().ok_or(RecorderError::NotFound {
            recorder_id: self.info.id,
            tree_index,
            from_satisfied,
        })
    }

    /// Last index of the open batch, else of the newest sealed batch.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::NoCommitments`] if nothing was recorded.
    pub fn last_recorded_leaf_index(&self) -> Result<LeafIndex, RecorderError> {
        self.pending
            .as_ref()
            .or(self.committed.last())
            .map(|batch| batch.last_leaf_index)
            .ok_or(RecorderError::NoCommitments(self.info.id))
    }

    /// The commitment (sealed or open) whose range contains `leaf_index`.
    pub fn commitment_for(&self, leaf_index: LeafIndex) -> Option<&BatchCommitment> {
        let tree_index = usize::try_from(leaf_index / self.info.batch_size).ok()?;
        self.committed
            .get(tree_index)
            .or_else(|| self.pending.as_ref().filter(|open| open.covers(leaf_index)))
    }

    /// Verify `leaf` at `leaf_index` against the root of the covering batch.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::LeafNotCommitted`] if no batch covers the index.
    pub fn merkle_proof(
        &self,
        leaf_index: LeafIndex,
        leaf: &Hash32,
        path: &[PathNode],
    ) -> Result<bool, RecorderError> {
        let batch = self
            .commitment_for(leaf_index)
            .ok_or(RecorderError::LeafNotCommitted {
                recorder_id: self.info.id,
                leaf_index,
            })?;
        Ok(verify_path(leaf, &batch.root, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebr_core::sha256;
    use proptest::prelude::*;

    fn admin() -> Address {
        Address::new([0xAA; 20])
    }

    fn root(tag: &str) -> Hash32 {
        sha256(tag.as_bytes())
    }

    fn recorder(batch_size: u64) -> Recorder {
        Recorder::new(RecorderId(0), admin(), batch_size).unwrap()
    }

    #[test]
    fn zero_batch_size_rejected() {
        assert_eq!(
            Recorder::new(RecorderId(0), admin(), 0).unwrap_err(),
            RecorderError::InvalidBatchSize(0)
        );
    }

    #[test]
    fn empty_recorder_has_no_commitments() {
        let r = recorder(8);
        assert_eq!(r.expected_start(), Some(0));
        assert_eq!(
            r.last_recorded_leaf_index().unwrap_err(),
            RecorderError::NoCommitments(RecorderId(0))
        );
        assert!(r.merkle_tree(0, false).is_err());
        assert!(r.merkle_tree(0, true).is_err());
    }

    #[test]
    fn batch_of_eight_open_seal_reopen() {
        let mut r = recorder(8);

        assert_eq!(r.record(&admin(), 0, root("r1")).unwrap(), RecordOutcome::Opened);
        let open = r.merkle_tree(0, false).unwrap();
        assert_eq!((open.first_leaf_index, open.last_leaf_index), (0, 0));
        assert_eq!(open.root, root("r1"));
        assert!(r.committed().is_empty());

        assert!(matches!(
            r.record(&admin(), 9, root("r2")),
            Err(RecorderError::SatisfiedBatchAbsent { limit: 8, .. })
        ));
        assert!(matches!(
            r.record(&admin(), 8, root("r2")),
            Err(RecorderError::UnableToRecordTree { low: 0, high: 7, .. })
        ));

        assert_eq!(r.record(&admin(), 7, root("r2")).unwrap(), RecordOutcome::Sealed);
        assert_eq!(r.last_recorded_leaf_index().unwrap(), 7);
        assert!(r.pending().is_none());
        let sealed = r.merkle_tree(0, true).unwrap();
        assert_eq!((sealed.first_leaf_index, sealed.last_leaf_index), (0, 7));
        assert_eq!(sealed.root, root("r2"));

        assert_eq!(r.record(&admin(), 8, root("r3")).unwrap(), RecordOutcome::Opened);
        let reopened = r.merkle_tree(0, false).unwrap();
        assert_eq!((reopened.first_leaf_index, reopened.last_leaf_index), (8, 8));
        assert_eq!(reopened.root, root("r3"));
        assert_eq!(r.last_recorded_leaf_index().unwrap(), 8);
    }

    #[test]
    fn non_admin_rejected_even_with_valid_index() {
        let mut r = recorder(8);
        let intruder = Address::new([0xBB; 20]);
        assert_eq!(
            r.record(&intruder, 0, root("x")).unwrap_err(),
            RecorderError::NotAdmin {
                recorder_id: RecorderId(0),
                caller: intruder
            }
        );
        assert!(r.pending().is_none());
    }

    #[test]
    fn open_batch_can_republish_same_index() {
        let mut r = recorder(8);
        r.record(&admin(), 3, root("a")).unwrap();
        assert_eq!(r.record(&admin(), 3, root("b")).unwrap(), RecordOutcome::Extended);
        assert_eq!(r.pending().unwrap().root, root("b"));
    }

    #[test]
    fn open_batch_cannot_shrink() {
        let mut r = recorder(8);
        r.record(&admin(), 5, root("a")).unwrap();
        assert!(matches!(
            r.record(&admin(), 4, root("b")),
            Err(RecorderError::UnableToRecordTree { low: 5, high: 7, .. })
        ));
        assert_eq!(r.pending().unwrap().root, root("a"));
    }

    #[test]
    fn first_record_can_seal_directly() {
        let mut r = recorder(4);
        assert_eq!(r.record(&admin(), 3, root("a")).unwrap(), RecordOutcome::Sealed);
        assert!(matches!(
            r.record(&admin(), 8, root("b")),
            Err(RecorderError::SatisfiedBatchAbsent { limit: 7, .. })
        ));
        assert_eq!(r.record(&admin(), 7, root("b")).unwrap(), RecordOutcome::Sealed);
        assert_eq!(r.committed().len(), 2);
    }

    #[test]
    fn sealed_range_cannot_be_rerecorded() {
        let mut r = recorder(4);
        r.record(&admin(), 3, root("a")).unwrap();
        assert!(matches!(
            r.record(&admin(), 2, root("b")),
            Err(RecorderError::UnableToRecordTree { low: 4, .. })
        ));
    }

    #[test]
    fn batch_size_one_seals_every_record() {
        let mut r = recorder(1);
        for i in 0..5 {
            assert_eq!(r.record(&admin(), i, root("x")).unwrap(), RecordOutcome::Sealed);
        }
        assert_eq!(r.committed().len(), 5);
        assert!(r.record(&admin(), 6, root("x")).is_err());
    }

    #[test]
    fn full_leaf_space_rejects_instead_of_overflowing() {
        let mut r = recorder(u64::MAX);
        assert_eq!(
            r.record(&admin(), u64::MAX - 1, root("a")).unwrap(),
            RecordOutcome::Sealed
        );
        assert_eq!(r.committed().len(), 1);
        assert_eq!(r.committed()[0].leaf_count(), u64::MAX);
        assert_eq!(r.expected_start(), Some(u64::MAX));

        // The next batch would start at MAX and end past it.
        assert!(matches!(
            r.record(&admin(), u64::MAX, root("b")),
            Err(RecorderError::UnableToRecordTree { low: u64::MAX, high: u64::MAX, .. })
        ));
        assert!(r.record(&admin(), u64::MAX, root("c")).is_err());
        assert_eq!(r.committed().len(), 1);
        assert!(r.pending().is_none());
    }

    #[test]
    fn batch_sealed_at_max_index_ends_the_recorder() {
        let half = 1u64 << 63;
        let mut r = recorder(half);
        assert_eq!(r.record(&admin(), half - 1, root("a")).unwrap(), RecordOutcome::Sealed);
        assert_eq!(r.record(&admin(), u64::MAX, root("b")).unwrap(), RecordOutcome::Sealed);
        assert_eq!(r.expected_start(), None);
        assert_eq!(r.last_recorded_leaf_index().unwrap(), u64::MAX);

        assert!(matches!(
            r.record(&admin(), u64::MAX, root("c")),
            Err(RecorderError::UnableToRecordTree { .. })
        ));
        assert_eq!(r.committed().len(), 2);
        assert_eq!(r.commitment_for(u64::MAX).unwrap().root, root("b"));
    }

    #[test]
    fn commitment_lookup_covers_sealed_and_open() {
        let mut r = recorder(8);
        r.record(&admin(), 7, root("sealed")).unwrap();
        r.record(&admin(), 10, root("open")).unwrap();

        assert_eq!(r.commitment_for(0).unwrap().root, root("sealed"));
        assert_eq!(r.commitment_for(7).unwrap().root, root("sealed"));
        assert_eq!(r.commitment_for(8).unwrap().root, root("open"));
        assert_eq!(r.commitment_for(10).unwrap().root, root("open"));
        assert!(r.commitment_for(11).is_none());
        assert!(r.commitment_for(u64::MAX).is_none());
    }

    #[test]
    fn merkle_proof_against_covering_root() {
        let mut r = recorder(8);
        let leaf = sha256(b"leaf");
        let sibling = sha256(b"test");
        let batch_root = ebr_crypto::compute_root(&leaf, &[PathNode::right(sibling)]);
        r.record(&admin(), 1, batch_root).unwrap();

        assert!(r.merkle_proof(1, &leaf, &[PathNode::right(sibling)]).unwrap());
        assert!(!r.merkle_proof(1, &leaf, &[PathNode::left(sibling)]).unwrap());
        assert_eq!(
            r.merkle_proof(2, &leaf, &[]).unwrap_err(),
            RecorderError::LeafNotCommitted {
                recorder_id: RecorderId(0),
                leaf_index: 2
            }
        );
    }

    #[test]
    fn not_found_for_open_slot_beyond_zero() {
        let mut r = recorder(8);
        r.record(&admin(), 0, root("a")).unwrap();
        assert!(r.merkle_tree(0, false).is_ok());
        assert!(matches!(
            r.merkle_tree(1, false),
            Err(RecorderError::NotFound { tree_index: 1, from_satisfied: false, .. })
        ));
    }

    fn check_partition(r: &Recorder) -> Result<(), TestCaseError> {
        let size = r.info().batch_size;
        for (i, batch) in r.committed().iter().enumerate() {
            prop_assert_eq!(batch.first_leaf_index, i as u64 * size);
            prop_assert_eq!(batch.leaf_count(), size);
        }
        if let Some(open) = r.pending() {
            prop_assert_eq!(Some(open.first_leaf_index), r.expected_start());
            prop_assert!(open.last_leaf_index < open.first_leaf_index + size - 1);
        }
        Ok(())
    }

    proptest! {
        /// Whatever the admin submits, sealed history stays a gap-free
        /// partition from 0, and rejected calls change nothing.
        #[test]
        fn sealed_history_is_contiguous(
            size in 1u64..10,
            steps in prop::collection::vec(0u64..40, 1..60),
        ) {
            let mut r = recorder(size);
            for last in steps {
                let before = r.clone();
                match r.record(&admin(), last, root("x")) {
                    Ok(_) => {}
                    Err(_) => {
                        prop_assert_eq!(r.committed(), before.committed());
                        prop_assert_eq!(r.pending(), before.pending());
                    }
                }
                check_partition(&r)?;
            }
        }
    }
}
