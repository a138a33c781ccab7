//! # ebr-core — Foundational Types for ebridge
//!
//! This crate is the bedrock of the ebridge workspace. It defines the
//! primitives shared by the commitment recorder and the swap registry.
//! Every other crate in the workspace depends on `ebr-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Hash32`, `Address`,
//!    `RecorderId`, `SwapId`. No bare byte arrays or integers for
//!    identifiers crossing a crate boundary.
//!
//! 2. **One hex convention.** Digests and addresses parse with or without a
//!    `0x` prefix in any case, and always render as lowercase `0x`-prefixed
//!    hex. Serde uses the same string form so indexer JSON round-trips.
//!    Amounts travel as decimal strings for the same reason.
//!
//! 3. **Floor-division ratios.** `SwapRatio::convert` is the single place
//!    where source amounts become target amounts.
//!
//! 4. **Events are data.** Ledger events are plain serializable records with
//!    a per-registry sequence number, not callbacks.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ebr-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod decimal;
pub mod digest;
pub mod error;
pub mod event;
pub mod identity;
pub mod ratio;

// Re-export primary types for ergonomic imports.
pub use digest::{sha256, sha256_concat, Hash32};
pub use error::BridgeError;
pub use event::{BridgeEvent, EventKind, EventLog};
pub use identity::{Address, Amount, LeafIndex, RecorderId, SwapId};
pub use ratio::SwapRatio;
