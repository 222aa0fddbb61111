//! Error types for the root anchor and the submitter loop.

use pc_03_block_storage::StorageError;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors raised by a [`crate::RootAnchor`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    /// The root ledger could not be reached.
    #[error("Root ledger unavailable: {0}")]
    Unavailable(String),

    /// Submitted header is not the block the root ledger expects next.
    #[error("Out of sync: root ledger expects block {anchor_block}, got {child_block}")]
    OutOfSync { anchor_block: u64, child_block: u64 },

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl AnchorError {
    /// True when a retry on a later tick may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AnchorError::Unavailable(_))
    }
}

/// Errors that abort a whole submitter tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitterError {
    /// Another tick is still running.
    #[error("Submission tick already in progress")]
    AlreadyRunning,

    #[error("Anchor error: {0}")]
    Anchor(#[from] AnchorError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
