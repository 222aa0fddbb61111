//! # Inbound Port
//!
//! The storage API the chain state machine drives.

use crate::domain::entities::{StoredTransaction, StoredUtxo, UnconfirmedTransaction};
use crate::domain::errors::StorageError;
use async_trait::async_trait;
use pc_02_ledger::{Block, ConfirmationSignature, Utxo, UtxoKey};
use shared_types::{Address, Hash};

/// Persistent store of blocks, confirmations and UTXO records.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Prepare the store. Inserts the genesis block when the store is empty.
    async fn connect(&self) -> Result<(), StorageError>;

    /// Append a block. It must link to the chain tip by hash and carry a
    /// number no stored block has. The number may be below the tip's.
    async fn append_block(&self, block: &Block) -> Result<(), StorageError>;

    /// Record the confirmation for slot `tx_index` of block `block_number`.
    async fn set_confirm_signature(
        &self,
        block_number: u64,
        tx_index: usize,
        confirmation: ConfirmationSignature,
    ) -> Result<(), StorageError>;

    /// Most recently appended block, the one the next append links to.
    async fn latest_block(&self) -> Result<Block, StorageError>;

    /// Highest block number stored.
    async fn highest_block_number(&self) -> Result<u64, StorageError>;

    /// All blocks in chain order, genesis first.
    async fn blocks(&self) -> Result<Vec<Block>, StorageError>;

    async fn block(&self, number: u64) -> Result<Option<Block>, StorageError>;

    /// Blocks with `from <= number <= to`, ascending. `None` leaves a side open.
    async fn blocks_in_range(
        &self,
        from: Option<u64>,
        to: Option<u64>,
    ) -> Result<Vec<Block>, StorageError>;

    async fn block_exists(&self, number: u64) -> Result<bool, StorageError>;

    /// Block holding the slot whose wire hash is `wire_hash`.
    async fn block_by_tx_hash(&self, wire_hash: &Hash) -> Result<Option<Block>, StorageError>;

    /// Decoded slot with its location.
    async fn transaction_by_hash(
        &self,
        wire_hash: &Hash,
    ) -> Result<Option<StoredTransaction>, StorageError>;

    /// Slots without a confirmation whose consumed inputs belong to `owner`.
    async fn unconfirmed_transactions(
        &self,
        owner: &Address,
    ) -> Result<Vec<UnconfirmedTransaction>, StorageError>;

    /// Insert or overwrite a UTXO record as unspent.
    async fn create_utxo(&self, utxo: &Utxo) -> Result<(), StorageError>;

    /// Mark a UTXO record spent.
    async fn spend_utxo(&self, key: &UtxoKey) -> Result<(), StorageError>;

    async fn utxo(&self, key: &UtxoKey) -> Result<Option<StoredUtxo>, StorageError>;

    /// Unspent UTXOs of `owner`, in key order.
    async fn utxos_by_address(&self, owner: &Address) -> Result<Vec<Utxo>, StorageError>;

    /// Create then spend in one step. Backends may make this atomic.
    async fn apply_utxo_changes(
        &self,
        created: &[Utxo],
        spent: &[UtxoKey],
    ) -> Result<(), StorageError> {
        for utxo in created {
            self.create_utxo(utxo).await?;
        }
        for key in spent {
            self.spend_utxo(key).await?;
        }
        Ok(())
    }
}
