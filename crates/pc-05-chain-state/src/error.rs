//! Error types for the chain state machine.

use pc_02_ledger::LedgerError;
use pc_03_block_storage::StorageError;
use pc_04_root_anchor::AnchorError;
use shared_crypto::CryptoError;
use shared_types::U256;
use thiserror::Error;

/// Result type alias for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors raised by [`crate::UtxoPlasmaChain`].
#[derive(Debug, Error)]
pub enum ChainError {
    /// Transaction has no first input.
    #[error("Transaction has no first input")]
    MissingInput,

    /// Input refers to a block at or past the next block number.
    #[error("Block has yet been included: input block {input_block}, next block {next_block}")]
    BlockNotYetIncluded { input_block: u64, next_block: u64 },

    #[error("Block {0} not found")]
    BlockNotFound(u64),

    #[error("Block {block_number} has no transaction {tx_index}")]
    SlotNotFound { block_number: u64, tx_index: usize },

    /// Confirmation missing or not signed by the originating slot's signers.
    #[error("Invalid confirmation signature")]
    InvalidConfirmationSignature,

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Sender has no live UTXO of the token.
    #[error("No asset found")]
    NoAssetFound,

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: U256, requested: U256 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Anchor error: {0}")]
    Anchor(#[from] AnchorError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl ChainError {
    /// True for rejections of a submitted or requested transaction.
    /// Nothing was mutated.
    pub fn is_admission_error(&self) -> bool {
        matches!(
            self,
            ChainError::MissingInput
                | ChainError::BlockNotYetIncluded { .. }
                | ChainError::BlockNotFound(_)
                | ChainError::SlotNotFound { .. }
                | ChainError::InvalidConfirmationSignature
                | ChainError::InvalidTransaction(_)
                | ChainError::NoAssetFound
                | ChainError::InsufficientFunds { .. }
        )
    }

    /// True when a retry may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ChainError::Storage(e) => e.is_transient(),
            ChainError::Anchor(e) => e.is_transient(),
            _ => false,
        }
    }
}
