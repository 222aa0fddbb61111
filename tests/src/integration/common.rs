//! # Shared Fixtures
//!
//! Deterministic keys, a chain harness over the in-memory backends, and a
//! block store wrapper that fails on demand.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pc_02_ledger::{Block, ConfirmationSignature, Utxo, UtxoKey};
use pc_03_block_storage::{
    BlockStore, InMemoryKVStore, KvBlockStore, MemoryBlockStore, StorageError, StoredTransaction,
    StoredUtxo, UnconfirmedTransaction,
};
use pc_04_root_anchor::{BlockSubmitter, InMemoryRootAnchor, SubmitterConfig};
use pc_05_chain_state::{ChainConfig, UtxoPlasmaChain};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Address, Hash, U256};

/// Interval used by every scenario.
pub const INTERVAL: u64 = 100_000;

/// Key derived from a 16-bit seed. Distinct seeds give distinct keys.
pub fn key(seed: u16) -> Secp256k1KeyPair {
    let mut bytes = [0u8; 32];
    bytes[0] = 0x5a;
    bytes[30..].copy_from_slice(&seed.to_be_bytes());
    Secp256k1KeyPair::from_bytes(bytes).expect("fixed seed is a valid scalar")
}

pub fn operator() -> Secp256k1KeyPair {
    key(0)
}

pub fn alice() -> Secp256k1KeyPair {
    key(1)
}

pub fn bob() -> Secp256k1KeyPair {
    key(2)
}

pub fn carol() -> Secp256k1KeyPair {
    key(3)
}

/// Sum of a UTXO list.
pub fn total_value(utxos: &[Utxo]) -> U256 {
    utxos.iter().fold(U256::zero(), |acc, utxo| acc + utxo.amount)
}

/// A chain with its store and anchor.
pub struct ChainHarness<S: BlockStore + 'static = MemoryBlockStore> {
    pub chain: Arc<UtxoPlasmaChain>,
    pub store: Arc<S>,
    pub anchor: Arc<InMemoryRootAnchor>,
}

impl ChainHarness<MemoryBlockStore> {
    /// Replayed chain over fresh in-memory storage.
    pub async fn new() -> Self {
        Self::over(Arc::new(KvBlockStore::new(InMemoryKVStore::new()))).await
    }
}

impl<S: BlockStore + 'static> ChainHarness<S> {
    /// Replayed chain over `store` with a fresh anchor.
    pub async fn over(store: Arc<S>) -> Self {
        let anchor = Arc::new(InMemoryRootAnchor::new(INTERVAL));
        Self::with_anchor(store, anchor).await
    }

    pub async fn with_anchor(store: Arc<S>, anchor: Arc<InMemoryRootAnchor>) -> Self {
        let chain = UtxoPlasmaChain::new(
            ChainConfig {
                block_interval: INTERVAL,
            },
            operator(),
            store.clone(),
            anchor.clone(),
        )
        .expect("non-zero interval");
        chain.replay().await.expect("replay of a fresh store");
        Self {
            chain: Arc::new(chain),
            store,
            anchor,
        }
    }

    /// Submitter over the same store and anchor.
    pub fn submitter(&self, config: SubmitterConfig) -> Arc<BlockSubmitter> {
        Arc::new(BlockSubmitter::new(
            self.anchor.clone(),
            self.store.clone(),
            config,
        ))
    }

    /// Lock a deposit on the anchor and commit it. Returns the deposit block.
    pub async fn deposit(&self, owner: Address, amount: u64) -> u64 {
        let block = self
            .anchor
            .deposit(owner, U256::from(amount), shared_types::NATIVE_TOKEN);
        self.chain
            .generate_next_block()
            .await
            .expect("deposit assembly");
        block
    }

    /// Transfer `amount` of the native token from the first UTXO of `from`.
    pub async fn transfer(
        &self,
        from: &Secp256k1KeyPair,
        to: Address,
        amount: u64,
    ) -> pc_05_chain_state::Result<pc_02_ledger::Transaction> {
        self.chain
            .create_transaction(
                shared_types::NATIVE_TOKEN,
                from.address(),
                to,
                U256::from(amount),
                None,
                from,
            )
            .await
    }
}

const NO_BLOCK: u64 = u64::MAX;

/// [`BlockStore`] wrapper with switchable write failures.
pub struct FlakyStore {
    inner: MemoryBlockStore,
    fail_appends: AtomicBool,
    refused_block: AtomicU64,
    fail_utxo_writes: AtomicBool,
    fail_confirmations: AtomicBool,
}

fn injected(what: &str) -> StorageError {
    StorageError::DatabaseError {
        message: format!("injected {} failure", what),
    }
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: KvBlockStore::new(InMemoryKVStore::new()),
            fail_appends: AtomicBool::new(false),
            refused_block: AtomicU64::new(NO_BLOCK),
            fail_utxo_writes: AtomicBool::new(false),
            fail_confirmations: AtomicBool::new(false),
        }
    }

    /// Fail every append.
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Fail appends of block `number` only.
    pub fn refuse_block(&self, number: Option<u64>) {
        self.refused_block
            .store(number.unwrap_or(NO_BLOCK), Ordering::SeqCst);
    }

    /// Fail UTXO record writes.
    pub fn fail_utxo_writes(&self, fail: bool) {
        self.fail_utxo_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_confirmations(&self, fail: bool) {
        self.fail_confirmations.store(fail, Ordering::SeqCst);
    }
}

impl Default for FlakyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockStore for FlakyStore {
    async fn connect(&self) -> Result<(), StorageError> {
        self.inner.connect().await
    }

    async fn append_block(&self, block: &Block) -> Result<(), StorageError> {
        if self.fail_appends.load(Ordering::SeqCst)
            || self.refused_block.load(Ordering::SeqCst) == block.number()
        {
            return Err(injected("append"));
        }
        self.inner.append_block(block).await
    }

    async fn set_confirm_signature(
        &self,
        block_number: u64,
        tx_index: usize,
        confirmation: ConfirmationSignature,
    ) -> Result<(), StorageError> {
        if self.fail_confirmations.load(Ordering::SeqCst) {
            return Err(injected("confirmation"));
        }
        self.inner
            .set_confirm_signature(block_number, tx_index, confirmation)
            .await
    }

    async fn latest_block(&self) -> Result<Block, StorageError> {
        self.inner.latest_block().await
    }

    async fn highest_block_number(&self) -> Result<u64, StorageError> {
        self.inner.highest_block_number().await
    }

    async fn blocks(&self) -> Result<Vec<Block>, StorageError> {
        self.inner.blocks().await
    }

    async fn block(&self, number: u64) -> Result<Option<Block>, StorageError> {
        self.inner.block(number).await
    }

    async fn blocks_in_range(
        &self,
        from: Option<u64>,
        to: Option<u64>,
    ) -> Result<Vec<Block>, StorageError> {
        self.inner.blocks_in_range(from, to).await
    }

    async fn block_exists(&self, number: u64) -> Result<bool, StorageError> {
        self.inner.block_exists(number).await
    }

    async fn block_by_tx_hash(&self, wire_hash: &Hash) -> Result<Option<Block>, StorageError> {
        self.inner.block_by_tx_hash(wire_hash).await
    }

    async fn transaction_by_hash(
        &self,
        wire_hash: &Hash,
    ) -> Result<Option<StoredTransaction>, StorageError> {
        self.inner.transaction_by_hash(wire_hash).await
    }

    async fn unconfirmed_transactions(
        &self,
        owner: &Address,
    ) -> Result<Vec<UnconfirmedTransaction>, StorageError> {
        self.inner.unconfirmed_transactions(owner).await
    }

    async fn create_utxo(&self, utxo: &Utxo) -> Result<(), StorageError> {
        if self.fail_utxo_writes.load(Ordering::SeqCst) {
            return Err(injected("UTXO write"));
        }
        self.inner.create_utxo(utxo).await
    }

    async fn spend_utxo(&self, key: &UtxoKey) -> Result<(), StorageError> {
        if self.fail_utxo_writes.load(Ordering::SeqCst) {
            return Err(injected("UTXO write"));
        }
        self.inner.spend_utxo(key).await
    }

    async fn utxo(&self, key: &UtxoKey) -> Result<Option<StoredUtxo>, StorageError> {
        self.inner.utxo(key).await
    }

    async fn utxos_by_address(&self, owner: &Address) -> Result<Vec<Utxo>, StorageError> {
        self.inner.utxos_by_address(owner).await
    }

    async fn apply_utxo_changes(
        &self,
        created: &[Utxo],
        spent: &[UtxoKey],
    ) -> Result<(), StorageError> {
        if self.fail_utxo_writes.load(Ordering::SeqCst) {
            return Err(injected("UTXO write"));
        }
        self.inner.apply_utxo_changes(created, spent).await
    }
}
