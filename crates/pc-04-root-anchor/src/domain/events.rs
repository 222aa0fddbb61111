//! Events observed on the root ledger.

use shared_types::{Address, UtxoPosition, U256};

/// Value locked on the root ledger, to be credited on the child chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositEvent {
    /// Child-chain block number the root ledger assigned to this deposit.
    pub deposit_block: u64,
    pub depositor: Address,
    /// Smallest unit.
    pub amount: U256,
    pub token: Address,
}

/// An exit started on the root ledger against a child-chain output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStartedEvent {
    pub utxo_pos: UtxoPosition,
    pub token: Address,
}
