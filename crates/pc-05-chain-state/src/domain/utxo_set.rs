//! The live UTXO set.
//!
//! Keyed by [`UtxoKey`] in a `BTreeMap`, so iteration is oldest first, with
//! an `(owner, token)` index for the "pick this owner's first outputs"
//! queries used by transfers and merges.

use pc_02_ledger::{Utxo, UtxoKey};
use shared_types::Address;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoSet {
    by_key: BTreeMap<UtxoKey, Utxo>,
    by_owner: BTreeMap<(Address, Address), BTreeSet<UtxoKey>>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace.
    pub fn insert(&mut self, utxo: Utxo) {
        let key = utxo.key();
        if let Some(previous) = self.by_key.insert(key, utxo) {
            self.unindex(&previous);
        }
        self.by_owner
            .entry((utxo.owner, utxo.token))
            .or_default()
            .insert(key);
    }

    pub fn remove(&mut self, key: &UtxoKey) -> Option<Utxo> {
        let utxo = self.by_key.remove(key)?;
        self.unindex(&utxo);
        Some(utxo)
    }

    fn unindex(&mut self, utxo: &Utxo) {
        let index_key = (utxo.owner, utxo.token);
        if let Some(keys) = self.by_owner.get_mut(&index_key) {
            keys.remove(&utxo.key());
            if keys.is_empty() {
                self.by_owner.remove(&index_key);
            }
        }
    }

    pub fn get(&self, key: &UtxoKey) -> Option<&Utxo> {
        self.by_key.get(key)
    }

    pub fn contains(&self, key: &UtxoKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Oldest live UTXO of `owner` for `token`.
    pub fn first_of(&self, owner: &Address, token: &Address) -> Option<UtxoKey> {
        self.by_owner
            .get(&(*owner, *token))
            .and_then(|keys| keys.iter().next().copied())
    }

    /// Two oldest live UTXOs of `owner` for `token`, or `None` if there are fewer.
    pub fn first_two_of(&self, owner: &Address, token: &Address) -> Option<(UtxoKey, UtxoKey)> {
        let mut keys = self.by_owner.get(&(*owner, *token))?.iter();
        match (keys.next(), keys.next()) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        }
    }

    /// All live UTXOs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Utxo> {
        self.by_key.values()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
