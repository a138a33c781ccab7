//! # ebr-recorder — Batched Commitment Recorder
//!
//! A recorder accumulates merkle roots published by its admin for a
//! fixed-capacity batch of leaf indices. While a batch is still being
//! finalized on the source chain, the admin may republish a growing root
//! for it; once the batch's last index is reached it seals and becomes
//! immutable history.
//!
//! ## State
//!
//! Each [`Recorder`] holds a sealed `Vec<BatchCommitment>` and an optional
//! open batch:
//!
//! ```text
//! no open batch ──record(last < start + size - 1)──▶ open [start, last]
//! open [f, l]   ──record(l <= last < f + size - 1)──▶ open [f, last]
//! open / none   ──record(last == f + size - 1)─────▶ sealed, no open batch
//! ```
//!
//! Sealed batches always partition leaf space contiguously from index 0,
//! which is what lets [`Recorder::commitment_for`] locate a sealed batch by
//! division instead of a search.
//!
//! ## Concurrency
//!
//! [`RecorderRegistry`] serializes writes per recorder with a
//! `parking_lot::Mutex`; distinct recorders never contend.

pub mod batch;
pub mod error;
pub mod recorder;
pub mod registry;

pub use batch::BatchCommitment;
pub use error::RecorderError;
pub use recorder::{RecordOutcome, Recorder, RecorderInfo};
pub use registry::RecorderRegistry;
