//! # Merkle Engine
//!
//! Fixed-leaf-count binary Keccak-256 tree used to commit the transaction
//! slots of a block.
//!
//! ## Scheme
//!
//! - Each leaf is `keccak256(preimage)`. An empty slot has the empty preimage,
//!   so its leaf is `keccak256("")`.
//! - Each parent is `keccak256(left || right)`.
//! - Every non-root level must have an even node count. Callers pad to a
//!   power of two (blocks always pad to 256 slots).
//!
//! ## Proof Layout
//!
//! Proofs are recorded leaf-first. The byte form emits, per level, one
//! direction byte followed by the 32-byte sibling:
//!
//! | Direction byte | Meaning |
//! |----------------|---------|
//! | `0x00` | current node is a right child (sibling on the left) |
//! | `0x01` | current node is a left child (sibling on the right) |
//!
//! This is the layout a root-ledger contract walks when checking an exit.

pub mod domain;

pub use domain::errors::MerkleError;
pub use domain::proof::{hash_pair, MerkleProof, ProofNode, SiblingPosition, PROOF_NODE_LENGTH};
pub use domain::tree::MerkleTree;
