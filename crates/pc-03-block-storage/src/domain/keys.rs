//! Key layout of the key-value backed block store.

use pc_02_ledger::UtxoKey;
use shared_types::Hash;

/// Key namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// Block record: `b/{be64 number}` -> `BlockRecord` JSON
    Block,
    /// Slot hash index: `h/{wire hash}` -> be64 block number
    TxHash,
    /// UTXO record: `u/{utxo key}` -> `UtxoRecord` JSON
    Utxo,
    /// Store metadata: `m/{name}`
    Meta,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Block => b"b/",
            KeyPrefix::TxHash => b"h/",
            KeyPrefix::Utxo => b"u/",
            KeyPrefix::Meta => b"m/",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    pub fn block_key(number: u64) -> Vec<u8> {
        KeyPrefix::Block.key(&number.to_be_bytes())
    }

    pub fn tx_hash_key(wire_hash: &Hash) -> Vec<u8> {
        KeyPrefix::TxHash.key(wire_hash)
    }

    pub fn utxo_key(key: &UtxoKey) -> Vec<u8> {
        KeyPrefix::Utxo.key(&key.to_bytes())
    }

    /// Number of the most recently appended block.
    pub fn head_key() -> Vec<u8> {
        KeyPrefix::Meta.key(b"head")
    }

    /// Highest block number ever appended.
    pub fn top_key() -> Vec<u8> {
        KeyPrefix::Meta.key(b"top")
    }
}

/// Decode a be64 block number value.
pub fn decode_number(bytes: &[u8]) -> Option<u64> {
    let arr: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(arr))
}
