//! # ebr-crypto — Cryptographic Primitives
//!
//! Provides the hashing building blocks shared by the recorder and the swap
//! registry:
//!
//! - **HashCodec** (`codec.rs`): fixed-width amount encoding with a chosen
//!   byte order, and the two-stage receipt leaf hash.
//! - **MerkleVerifier** (`merkle.rs`): folds a leaf up an oriented sibling
//!   path and compares the result with a committed root.
//!
//! Both must reproduce the source-chain indexer byte for byte. The leaf
//! layout and the left/right pairing convention are external contracts;
//! changing either silently invalidates every root already committed.
//!
//! ## Crate Policy
//!
//! - Depends only on `ebr-core` internally.
//! - Never builds trees. Roots are computed off-chain and only verified here.
//! - No mocking of hashing in tests. All vectors are real SHA-256 values
//!   checked against Python `hashlib`.

pub mod codec;
pub mod error;
pub mod merkle;

pub use codec::{encode_amount, leaf_hash, AmountEncoding, LeafHash};
pub use error::CodecError;
pub use merkle::{compute_root, verify_path, MerklePath, PathNode};
