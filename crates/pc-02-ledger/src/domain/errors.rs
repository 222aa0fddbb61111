//! # Domain Errors

use pc_01_merkle::MerkleError;
use shared_crypto::CryptoError;
use shared_types::TypeError;
use thiserror::Error;

/// Result alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised while encoding, decoding or assembling ledger entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// RLP structure was malformed.
    #[error("RLP decode error: {0}")]
    Rlp(String),

    /// A decoded field had an unacceptable value.
    #[error("Invalid transaction field {index}: {reason}")]
    InvalidField { index: usize, reason: String },

    /// Wire blob shorter than the two trailing signatures.
    #[error("Wire data too short: {0} bytes")]
    WireTooShort(usize),

    /// Output declared an amount without an owner.
    #[error("Output {0} has an amount but no owner")]
    OwnerlessOutput(usize),

    /// Block would exceed its slot capacity.
    #[error("Too many transactions for one block: {count} (capacity {capacity})")]
    TooManyTransactions { count: usize, capacity: usize },

    /// Slot index does not exist in the block.
    #[error("Slot {index} out of range (block has {len} slots)")]
    SlotOutOfRange { index: usize, len: usize },

    /// Header has no merkle root (genesis).
    #[error("Block {0} has no merkle root")]
    MissingRoot(u64),

    /// Persisted record could not be turned back into an entity.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl From<rlp::DecoderError> for LedgerError {
    fn from(e: rlp::DecoderError) -> Self {
        LedgerError::Rlp(format!("{:?}", e))
    }
}
