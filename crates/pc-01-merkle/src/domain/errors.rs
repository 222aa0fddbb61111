//! # Domain Errors

use thiserror::Error;

/// Errors raised while building trees or handling proofs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// No leaves were supplied.
    #[error("Cannot build a merkle tree from zero leaves")]
    Empty,

    /// A non-root level had an odd node count.
    #[error("Odd node count {count} at level {level}")]
    OddLevel { level: usize, count: usize },

    /// Leaf index out of bounds.
    #[error("Invalid leaf index {index} (leaf count: {count})")]
    InvalidIndex { index: usize, count: usize },

    /// Proof byte form is not a whole number of nodes.
    #[error("Invalid proof length: {0} bytes")]
    InvalidProofLength(usize),

    /// Proof byte form carried an unknown direction byte.
    #[error("Invalid proof direction byte: {0:#04x}")]
    InvalidDirection(u8),
}
