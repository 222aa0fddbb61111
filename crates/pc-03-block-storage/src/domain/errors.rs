//! # Domain Errors
//!
//! Error types for the Block Storage subsystem.

use pc_02_ledger::{LedgerError, UtxoKey};
use shared_types::{hex_util, Hash};
use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No block with this number.
    BlockNotFound { number: u64 },

    /// Appended block does not link to the chain tip.
    LinkageMismatch {
        block_number: u64,
        expected: Hash,
        actual: Hash,
    },

    /// A block with this number is already stored.
    DuplicateBlockNumber { number: u64 },

    /// Slot index does not exist in the block.
    SlotNotFound { block_number: u64, index: usize },

    /// No record for this UTXO.
    UtxoNotFound { key: UtxoKey },

    /// Store has no blocks yet; `connect` was not called.
    NotConnected,

    /// Database I/O error.
    DatabaseError { message: String },

    /// Serialization/deserialization error.
    SerializationError { message: String },

    /// A stored record failed validation.
    CorruptRecord { message: String },

    /// Database lock could not be acquired (process already running).
    DatabaseLocked { message: String },
}

impl StorageError {
    /// True for failures a retry may clear.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::DatabaseError { .. } | StorageError::DatabaseLocked { .. }
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::BlockNotFound { number } => write!(f, "Block {} not found", number),
            StorageError::LinkageMismatch {
                block_number,
                expected,
                actual,
            } => write!(
                f,
                "Block {} does not link to the chain tip: previous hash {} != {}",
                block_number,
                hex_util::to_hex(actual),
                hex_util::to_hex(expected)
            ),
            StorageError::DuplicateBlockNumber { number } => {
                write!(f, "Block {} is already stored", number)
            }
            StorageError::SlotNotFound {
                block_number,
                index,
            } => write!(f, "Block {} has no slot {}", block_number, index),
            StorageError::UtxoNotFound { key } => write!(f, "UTXO {} not found", key),
            StorageError::NotConnected => write!(f, "Block store is empty; connect first"),
            StorageError::DatabaseError { message } => write!(f, "Database error: {}", message),
            StorageError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
            StorageError::CorruptRecord { message } => write!(f, "Corrupt record: {}", message),
            StorageError::DatabaseLocked { message } => write!(f, "Database locked: {}", message),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<LedgerError> for StorageError {
    fn from(err: LedgerError) -> Self {
        StorageError::CorruptRecord {
            message: err.to_string(),
        }
    }
}

/// Key-value store errors.
#[derive(Debug, Clone)]
pub enum KVStoreError {
    /// I/O error during read/write.
    IOError { message: String },
    /// Data corruption in the store.
    CorruptionError { message: String },
    /// Another process holds the store.
    Locked { message: String },
}

impl fmt::Display for KVStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KVStoreError::IOError { message } => write!(f, "KV store I/O error: {}", message),
            KVStoreError::CorruptionError { message } => {
                write!(f, "KV store corruption: {}", message)
            }
            KVStoreError::Locked { message } => write!(f, "KV store locked: {}", message),
        }
    }
}

impl std::error::Error for KVStoreError {}

impl From<KVStoreError> for StorageError {
    fn from(err: KVStoreError) -> Self {
        match err {
            KVStoreError::Locked { message } => StorageError::DatabaseLocked { message },
            KVStoreError::CorruptionError { message } => StorageError::CorruptRecord { message },
            other => StorageError::DatabaseError {
                message: other.to_string(),
            },
        }
    }
}
