//! Query result entities.

use pc_02_ledger::{ConfirmationSignature, Transaction, Utxo};
use shared_types::Hash;

/// A slot located by its wire hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTransaction {
    pub block_number: u64,
    pub tx_index: usize,
    pub transaction: Transaction,
    pub confirmation: Option<ConfirmationSignature>,
}

/// A UTXO record with its spent flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredUtxo {
    pub utxo: Utxo,
    pub spent: bool,
}

/// A slot still waiting for a confirmation from one of its input owners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconfirmedTransaction {
    /// Block holding the slot.
    pub block_number: u64,
    /// Slot index within the block.
    pub tx_index: usize,
    pub transaction: Transaction,
    /// `keccak(tx_hash || root)`: what the owner has to sign.
    pub confirmation_hash: Hash,
    /// Input slots owned by the queried address.
    pub owned_inputs: Vec<usize>,
}
