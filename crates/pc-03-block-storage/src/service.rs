//! # Key-Value Block Store
//!
//! `KvBlockStore` implements [`BlockStore`] over any [`KeyValueStore`].
//!
//! Blocks link by hash to the block appended before them. Numbers only
//! need to be unique: a deposit block may follow an interval block with a
//! higher number. `m/head` tracks the chain tip and `m/top` the highest
//! number.
//!
//! Every write that touches more than one key goes through a single
//! `atomic_batch_write`, and every read-check-write sequence (linkage,
//! confirmation updates, spends) runs under the write half of one
//! `parking_lot::RwLock`, so concurrent callers never interleave.

use crate::domain::entities::{StoredTransaction, StoredUtxo, UnconfirmedTransaction};
use crate::domain::errors::StorageError;
use crate::domain::keys::{decode_number, KeyPrefix};
use crate::ports::inbound::BlockStore;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use pc_02_ledger::{
    confirmation_hash, Block, BlockRecord, ConfirmationSignature, LedgerError, Utxo, UtxoKey,
    UtxoRecord,
};
use shared_types::{hex_util, Address, Hash};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// [`BlockStore`] over a key-value backend.
pub struct KvBlockStore<S: KeyValueStore> {
    kv: RwLock<S>,
}

impl<S: KeyValueStore> KvBlockStore<S> {
    pub fn new(kv: S) -> Self {
        Self {
            kv: RwLock::new(kv),
        }
    }

    /// Give the backend back, e.g. to reopen it in a test.
    pub fn into_inner(self) -> S {
        self.kv.into_inner()
    }

    fn read_block(kv: &S, number: u64) -> Result<Option<Block>, StorageError> {
        match kv.get(&KeyPrefix::block_key(number))? {
            Some(bytes) => Ok(Some(Self::decode_block(&bytes)?)),
            None => Ok(None),
        }
    }

    fn decode_block(bytes: &[u8]) -> Result<Block, StorageError> {
        let record: BlockRecord = serde_json::from_slice(bytes)?;
        Ok(Block::try_from(record)?)
    }

    fn encode_block(block: &Block) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec(&BlockRecord::from(block))?)
    }

    fn meta_number(kv: &S, key: &[u8], name: &str) -> Result<Option<u64>, StorageError> {
        match kv.get(key)? {
            Some(bytes) => decode_number(&bytes).map(Some).ok_or_else(|| {
                StorageError::CorruptRecord {
                    message: format!("{} pointer is not a be64 number", name),
                }
            }),
            None => Ok(None),
        }
    }

    fn head(kv: &S) -> Result<Option<u64>, StorageError> {
        Self::meta_number(kv, &KeyPrefix::head_key(), "head")
    }

    fn top(kv: &S) -> Result<Option<u64>, StorageError> {
        match Self::meta_number(kv, &KeyPrefix::top_key(), "top")? {
            Some(top) => Ok(Some(top)),
            None => Self::head(kv),
        }
    }

    /// All blocks in ascending number order. Big-endian keys sort numerically.
    fn scan_blocks(kv: &S) -> Result<Vec<Block>, StorageError> {
        let mut entries = kv.prefix_scan(KeyPrefix::Block.as_bytes())?;
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
            .iter()
            .map(|(_, value)| Self::decode_block(value))
            .collect()
    }

    /// All blocks in chain order: genesis, then each block's successor by
    /// previous hash.
    fn chain_blocks(kv: &S) -> Result<Vec<Block>, StorageError> {
        let mut stored = Self::scan_blocks(kv)?.into_iter();
        let Some(genesis) = stored.next() else {
            return Ok(Vec::new());
        };
        let total = stored.len() + 1;
        let mut successors: HashMap<Hash, Block> =
            stored.map(|block| (block.previous_hash(), block)).collect();

        let mut ordered = Vec::with_capacity(total);
        let mut tip = genesis.hash();
        ordered.push(genesis);
        while let Some(next) = successors.remove(&tip) {
            tip = next.hash();
            ordered.push(next);
        }
        if ordered.len() != total {
            return Err(StorageError::CorruptRecord {
                message: format!(
                    "{} of {} blocks are not on the chain from genesis",
                    total - ordered.len(),
                    total
                ),
            });
        }
        Ok(ordered)
    }

    fn read_utxo(kv: &S, key: &UtxoKey) -> Result<Option<StoredUtxo>, StorageError> {
        match kv.get(&KeyPrefix::utxo_key(key))? {
            Some(bytes) => {
                let record: UtxoRecord = serde_json::from_slice(&bytes)?;
                Ok(Some(StoredUtxo {
                    utxo: record.to_utxo()?,
                    spent: record.spent,
                }))
            }
            None => Ok(None),
        }
    }

    fn utxo_put(utxo: &Utxo, spent: bool) -> Result<BatchOperation, StorageError> {
        let record = UtxoRecord::from_utxo(utxo, spent);
        Ok(BatchOperation::put(
            KeyPrefix::utxo_key(&utxo.key()),
            serde_json::to_vec(&record)?,
        ))
    }

    fn block_ops(block: &Block, top: u64) -> Result<Vec<BatchOperation>, StorageError> {
        let number = block.number();
        let mut ops = Vec::with_capacity(block.hashes.len() + 3);
        ops.push(BatchOperation::put(
            KeyPrefix::block_key(number),
            Self::encode_block(block)?,
        ));
        for wire_hash in &block.hashes {
            ops.push(BatchOperation::put(
                KeyPrefix::tx_hash_key(wire_hash),
                number.to_be_bytes().to_vec(),
            ));
        }
        ops.push(BatchOperation::put(
            KeyPrefix::head_key(),
            number.to_be_bytes().to_vec(),
        ));
        ops.push(BatchOperation::put(
            KeyPrefix::top_key(),
            top.max(number).to_be_bytes().to_vec(),
        ));
        Ok(ops)
    }

    fn slot_error(block_number: u64, err: LedgerError) -> StorageError {
        match err {
            LedgerError::SlotOutOfRange { index, .. } => StorageError::SlotNotFound {
                block_number,
                index,
            },
            other => other.into(),
        }
    }

    /// Input slots of slot `index` whose consumed UTXO record belongs to `owner`.
    fn owned_inputs(
        kv: &S,
        block: &Block,
        index: usize,
        owner: &Address,
    ) -> Result<Option<UnconfirmedTransaction>, StorageError> {
        let Some(root) = block.merkle_root() else {
            return Ok(None);
        };
        let transaction = block.transaction(index)?;
        let mut owned = Vec::new();
        for (slot, position) in transaction.present_inputs() {
            let key = UtxoKey::new(position, transaction.token);
            if let Some(stored) = Self::read_utxo(kv, &key)? {
                if &stored.utxo.owner == owner {
                    owned.push(slot);
                }
            }
        }
        if owned.is_empty() {
            return Ok(None);
        }
        let tx_hash = block.tx_hash(index)?;
        Ok(Some(UnconfirmedTransaction {
            block_number: block.number(),
            tx_index: index,
            transaction,
            confirmation_hash: confirmation_hash(&tx_hash, &root),
            owned_inputs: owned,
        }))
    }
}

#[async_trait]
impl<S: KeyValueStore> BlockStore for KvBlockStore<S> {
    async fn connect(&self) -> Result<(), StorageError> {
        let mut kv = self.kv.write();
        if Self::head(&kv)?.is_some() {
            return Ok(());
        }
        let genesis = Block::genesis();
        kv.atomic_batch_write(Self::block_ops(&genesis, 0)?)?;
        info!(
            "[pc-03] 🌱 Inserted genesis block {}",
            hex_util::to_hex(&genesis.hash())
        );
        Ok(())
    }

    async fn append_block(&self, block: &Block) -> Result<(), StorageError> {
        let mut kv = self.kv.write();
        let head = Self::head(&kv)?.ok_or(StorageError::NotConnected)?;
        let latest = Self::read_block(&kv, head)?.ok_or(StorageError::BlockNotFound { number: head })?;

        let expected = latest.hash();
        if block.previous_hash() != expected {
            return Err(StorageError::LinkageMismatch {
                block_number: block.number(),
                expected,
                actual: block.previous_hash(),
            });
        }
        if kv.exists(&KeyPrefix::block_key(block.number()))? {
            return Err(StorageError::DuplicateBlockNumber {
                number: block.number(),
            });
        }

        let top = Self::top(&kv)?.unwrap_or(head);
        kv.atomic_batch_write(Self::block_ops(block, top)?)?;
        debug!(
            "[pc-03] Appended block {} with {} slots",
            block.number(),
            block.len()
        );
        Ok(())
    }

    async fn set_confirm_signature(
        &self,
        block_number: u64,
        tx_index: usize,
        confirmation: ConfirmationSignature,
    ) -> Result<(), StorageError> {
        let mut kv = self.kv.write();
        let mut block = Self::read_block(&kv, block_number)?.ok_or(StorageError::BlockNotFound {
            number: block_number,
        })?;
        block
            .set_confirmation(tx_index, confirmation)
            .map_err(|e| Self::slot_error(block_number, e))?;
        kv.put(
            &KeyPrefix::block_key(block_number),
            &Self::encode_block(&block)?,
        )?;
        Ok(())
    }

    async fn latest_block(&self) -> Result<Block, StorageError> {
        let kv = self.kv.read();
        let head = Self::head(&kv)?.ok_or(StorageError::NotConnected)?;
        Self::read_block(&kv, head)?.ok_or(StorageError::BlockNotFound { number: head })
    }

    async fn highest_block_number(&self) -> Result<u64, StorageError> {
        let kv = self.kv.read();
        Self::top(&kv)?.ok_or(StorageError::NotConnected)
    }

    async fn blocks(&self) -> Result<Vec<Block>, StorageError> {
        let kv = self.kv.read();
        Self::chain_blocks(&kv)
    }

    async fn block(&self, number: u64) -> Result<Option<Block>, StorageError> {
        let kv = self.kv.read();
        Self::read_block(&kv, number)
    }

    async fn blocks_in_range(
        &self,
        from: Option<u64>,
        to: Option<u64>,
    ) -> Result<Vec<Block>, StorageError> {
        let kv = self.kv.read();
        let from = from.unwrap_or(0);
        let to = to.unwrap_or(u64::MAX);
        let mut entries: Vec<(u64, Vec<u8>)> = kv
            .prefix_scan(KeyPrefix::Block.as_bytes())?
            .into_iter()
            .filter_map(|(key, value)| {
                decode_number(&key[KeyPrefix::Block.as_bytes().len()..]).map(|n| (n, value))
            })
            .filter(|(n, _)| *n >= from && *n <= to)
            .collect();
        entries.sort_by_key(|(n, _)| *n);
        entries
            .iter()
            .map(|(_, value)| Self::decode_block(value))
            .collect()
    }

    async fn block_exists(&self, number: u64) -> Result<bool, StorageError> {
        let kv = self.kv.read();
        Ok(kv.exists(&KeyPrefix::block_key(number))?)
    }

    async fn block_by_tx_hash(&self, wire_hash: &Hash) -> Result<Option<Block>, StorageError> {
        let kv = self.kv.read();
        let Some(bytes) = kv.get(&KeyPrefix::tx_hash_key(wire_hash))? else {
            return Ok(None);
        };
        let number = decode_number(&bytes).ok_or_else(|| StorageError::CorruptRecord {
            message: format!("hash index for {} is not a number", hex_util::to_hex(wire_hash)),
        })?;
        Self::read_block(&kv, number)
    }

    async fn transaction_by_hash(
        &self,
        wire_hash: &Hash,
    ) -> Result<Option<StoredTransaction>, StorageError> {
        let Some(block) = self.block_by_tx_hash(wire_hash).await? else {
            return Ok(None);
        };
        let Some(index) = block.slot_of(wire_hash) else {
            return Ok(None);
        };
        Ok(Some(StoredTransaction {
            block_number: block.number(),
            tx_index: index,
            transaction: block.transaction(index)?,
            confirmation: block.confirmation(index),
        }))
    }

    async fn unconfirmed_transactions(
        &self,
        owner: &Address,
    ) -> Result<Vec<UnconfirmedTransaction>, StorageError> {
        let kv = self.kv.read();
        let mut pending = Vec::new();
        for block in Self::scan_blocks(&kv)? {
            for index in 0..block.len() {
                if block.confirmation(index).is_some() {
                    continue;
                }
                if let Some(entry) = Self::owned_inputs(&kv, &block, index, owner)? {
                    pending.push(entry);
                }
            }
        }
        Ok(pending)
    }

    async fn create_utxo(&self, utxo: &Utxo) -> Result<(), StorageError> {
        let mut kv = self.kv.write();
        kv.atomic_batch_write(vec![Self::utxo_put(utxo, false)?])?;
        Ok(())
    }

    async fn spend_utxo(&self, key: &UtxoKey) -> Result<(), StorageError> {
        let mut kv = self.kv.write();
        let stored = Self::read_utxo(&kv, key)?.ok_or(StorageError::UtxoNotFound { key: *key })?;
        kv.atomic_batch_write(vec![Self::utxo_put(&stored.utxo, true)?])?;
        Ok(())
    }

    async fn utxo(&self, key: &UtxoKey) -> Result<Option<StoredUtxo>, StorageError> {
        let kv = self.kv.read();
        Self::read_utxo(&kv, key)
    }

    async fn utxos_by_address(&self, owner: &Address) -> Result<Vec<Utxo>, StorageError> {
        let kv = self.kv.read();
        let mut owned = BTreeMap::new();
        for (_, value) in kv.prefix_scan(KeyPrefix::Utxo.as_bytes())? {
            let record: UtxoRecord = serde_json::from_slice(&value)?;
            if record.spent {
                continue;
            }
            let utxo = record.to_utxo()?;
            if &utxo.owner == owner {
                owned.insert(utxo.key(), utxo);
            }
        }
        Ok(owned.into_values().collect())
    }

    async fn apply_utxo_changes(
        &self,
        created: &[Utxo],
        spent: &[UtxoKey],
    ) -> Result<(), StorageError> {
        let mut kv = self.kv.write();
        // Later entries win, so a UTXO created and spent in one call lands spent
        let mut staged: BTreeMap<UtxoKey, (Utxo, bool)> = BTreeMap::new();
        for utxo in created {
            staged.insert(utxo.key(), (*utxo, false));
        }
        for key in spent {
            if let Some(entry) = staged.get_mut(key) {
                entry.1 = true;
                continue;
            }
            let stored = Self::read_utxo(&kv, key)?.ok_or(StorageError::UtxoNotFound { key: *key })?;
            staged.insert(*key, (stored.utxo, true));
        }
        let ops = staged
            .values()
            .map(|(utxo, spent)| Self::utxo_put(utxo, *spent))
            .collect::<Result<Vec<_>, _>>()?;
        kv.atomic_batch_write(ops)?;
        Ok(())
    }
}
