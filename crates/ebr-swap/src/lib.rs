//! # ebr-swap — Cross-Ledger Swap Registry
//!
//! Releases escrowed target-ledger tokens to the receiver of a source-chain
//! receipt once that receipt is proven against a root held by an
//! [`ebr_recorder::RecorderRegistry`].
//!
//! ## Security Invariants
//!
//! - **No replay.** A receipt's `unique_id` is consumed at most once per
//!   swap pair. A replayed receipt fails before any proof work is done.
//! - **No overdraw.** For every leg, `swapped_amount <= deposit_amount`
//!   holds at all times. The deposit check and the accounting update run
//!   under the same per-pair lock, so concurrent redemptions cannot both
//!   pass the check.
//! - **All or nothing.** Every leg's transfer is submitted to the
//!   [`TokenLedger`] as one batch. Accounting and the consumed set change
//!   only after the batch succeeds.
//! - **Floor division.** Conversions never round up.
//!
//! ## Crate Policy
//!
//! - The token ledger is a collaborator behind a trait; this crate never
//!   mints. [`InMemoryTokenLedger`] backs tests and the CLI.

pub mod error;
pub mod pair;
pub mod registry;
pub mod token;

pub use error::SwapError;
pub use pair::{ReceiptProof, SwapLeg, SwapPair};
pub use registry::SwapRegistry;
pub use token::{InMemoryTokenLedger, TokenError, TokenLedger, TokenTransfer};
