//! # Block Storage (pc-03)
//!
//! Persistence for blocks, confirmation signatures and UTXO records.
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Linkage: `block.previous_hash == hash(tip)` | `append_block` |
//! | Unique block numbers | `append_block` |
//! | Genesis present after `connect` | `connect` |
//! | Atomic block writes (block, hash index, head, top) | `KeyValueStore::atomic_batch_write` |
//! | UTXO upserts are idempotent | `create_utxo` |
//!
//! ## Key Layout
//!
//! | Prefix | Key suffix | Value |
//! |--------|------------|-------|
//! | `b/` | be64 block number | `BlockRecord` JSON |
//! | `h/` | slot wire hash | be64 block number |
//! | `u/` | `UtxoKey::to_bytes()` | `UtxoRecord` JSON |
//! | `m/` | `head` | be64 number of the chain tip |
//! | `m/` | `top` | be64 highest block number |
//!
//! ## Crate Structure
//!
//! - `domain/` - errors, key layout, query result entities
//! - `ports/` - `BlockStore` (inbound) and `KeyValueStore` (outbound)
//! - `adapters/` - file-backed key-value store and its process lock
//! - `service.rs` - `KvBlockStore`, the `BlockStore` over any `KeyValueStore`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::file::FileBackedKVStore;
pub use adapters::lock::{DatabaseLock, LockError};
pub use domain::entities::{StoredTransaction, StoredUtxo, UnconfirmedTransaction};
pub use domain::errors::{KVStoreError, StorageError};
pub use domain::keys::KeyPrefix;
pub use ports::inbound::BlockStore;
pub use ports::outbound::{BatchOperation, InMemoryKVStore, KeyValueStore, ScanResult};
pub use service::KvBlockStore;

/// Block store over the in-memory backend.
pub type MemoryBlockStore = KvBlockStore<InMemoryKVStore>;

/// Block store over the file-backed backend.
pub type FileBlockStore = KvBlockStore<FileBackedKVStore>;
