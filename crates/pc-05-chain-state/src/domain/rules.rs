//! Per-type state transition rules.
//!
//! Every function here is pure over a [`UtxoSet`]. Mutations are recorded in
//! a [`UtxoDelta`] so the caller can persist them, or undo them when the
//! block they belong to fails to commit.

use super::utxo_set::UtxoSet;
use pc_02_ledger::{Transaction, Utxo, UtxoKey};
use shared_crypto::recover_message;
use shared_types::{Address, TxType, UtxoPosition, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UtxoChange {
    Created(Utxo),
    Spent(Utxo),
}

/// Ordered log of mutations applied to a [`UtxoSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoDelta {
    changes: Vec<UtxoChange>,
}

impl UtxoDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Every UTXO created, in order.
    pub fn created(&self) -> Vec<Utxo> {
        self.changes
            .iter()
            .filter_map(|change| match change {
                UtxoChange::Created(utxo) => Some(*utxo),
                UtxoChange::Spent(_) => None,
            })
            .collect()
    }

    /// Keys of every UTXO spent, in order.
    pub fn spent_keys(&self) -> Vec<UtxoKey> {
        self.changes
            .iter()
            .filter_map(|change| match change {
                UtxoChange::Spent(utxo) => Some(utxo.key()),
                UtxoChange::Created(_) => None,
            })
            .collect()
    }

    /// Undo every change on `set`, newest first.
    pub fn revert(self, set: &mut UtxoSet) {
        for change in self.changes.into_iter().rev() {
            match change {
                UtxoChange::Created(utxo) => {
                    set.remove(&utxo.key());
                }
                UtxoChange::Spent(utxo) => set.insert(utxo),
            }
        }
    }
}

fn input_key(position: UtxoPosition, token: Address) -> UtxoKey {
    UtxoKey::new(position, token)
}

/// Every present input references a live UTXO of `tx.token`.
pub fn can_spend(set: &UtxoSet, tx: &Transaction) -> bool {
    tx.present_inputs()
        .all(|(_, position)| set.contains(&input_key(position, tx.token)))
}

/// At least one output has a non-zero owner and amount.
pub fn can_create(tx: &Transaction) -> bool {
    tx.present_outputs().any(|(_, output)| output.is_creatable())
}

/// Signature and conservation check for NORMAL transactions. Other types
/// are operator-built and pass.
///
/// Each present input must be live, distinct, and signed in its slot by the
/// UTXO owner over [`Transaction::hash`]. The consumed total must equal
/// `denom1 + denom2 + fee`.
pub fn is_valid_transaction(set: &UtxoSet, tx: &Transaction) -> bool {
    if tx.tx_type != TxType::Normal {
        return true;
    }
    if let [Some(first), Some(second)] = tx.inputs {
        if first == second {
            return false;
        }
    }

    let hash = tx.hash();
    let mut consumed = U256::zero();
    for (slot, position) in tx.present_inputs() {
        let Some(utxo) = set.get(&input_key(position, tx.token)) else {
            return false;
        };
        let Some(signature) = tx.signatures[slot] else {
            return false;
        };
        match recover_message(&hash, &signature) {
            Ok(signer) if signer == utxo.owner => {}
            _ => return false,
        }
        consumed = match consumed.checked_add(utxo.amount) {
            Some(total) => total,
            None => return false,
        };
    }
    tx.total_out() == Some(consumed)
}

/// Remove every live input of `tx`.
pub fn spend(set: &mut UtxoSet, tx: &Transaction, delta: &mut UtxoDelta) {
    for (_, position) in tx.present_inputs() {
        if let Some(utxo) = set.remove(&input_key(position, tx.token)) {
            delta.changes.push(UtxoChange::Spent(utxo));
        }
    }
}

/// Insert every creatable output of `tx` at `(block_number, tx_index, o)`.
pub fn create(
    set: &mut UtxoSet,
    block_number: u64,
    tx_index: u32,
    tx: &Transaction,
    delta: &mut UtxoDelta,
) {
    for (o_index, output) in tx.present_outputs() {
        if !output.is_creatable() {
            continue;
        }
        let utxo = Utxo::new(
            UtxoPosition::new(block_number, tx_index, o_index as u8),
            output.owner,
            output.amount,
            tx.token,
        );
        set.insert(utxo);
        delta.changes.push(UtxoChange::Created(utxo));
    }
}

/// Apply the full transition rule for `tx` in slot `tx_index` of block
/// `block_number`, as replay does. Returns whether anything changed.
pub fn apply_transaction(
    set: &mut UtxoSet,
    block_number: u64,
    tx_index: u32,
    tx: &Transaction,
    delta: &mut UtxoDelta,
) -> bool {
    let before = delta.changes.len();
    match tx.tx_type {
        TxType::Deposit => {
            if can_create(tx) {
                create(set, block_number, tx_index, tx, delta);
            }
        }
        TxType::Merge => {
            if can_spend(set, tx) && can_create(tx) {
                spend(set, tx, delta);
                create(set, block_number, tx_index, tx, delta);
            }
        }
        TxType::Withdraw => {
            if can_spend(set, tx) {
                spend(set, tx, delta);
            }
        }
        TxType::Normal => {
            if can_spend(set, tx) {
                spend(set, tx, delta);
            }
            if can_create(tx) {
                create(set, block_number, tx_index, tx, delta);
            }
        }
    }
    delta.changes.len() > before
}

/// Unsigned MERGE of the two oldest UTXOs of `owner` for `token`, if there are two.
pub fn merge_transaction(set: &UtxoSet, owner: &Address, token: &Address) -> Option<Transaction> {
    let (first, second) = set.first_two_of(owner, token)?;
    let a = set.get(&first)?;
    let b = set.get(&second)?;
    let amount = a.amount.checked_add(b.amount)?;
    Some(Transaction::merge(
        first.position,
        second.position,
        *owner,
        amount,
        *token,
    ))
}
