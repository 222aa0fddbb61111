//! # Chain State (pc-05)
//!
//! The UTXO chain state machine. It owns the live UTXO set and the pending
//! pool, assembles blocks, admits user transactions and runs the
//! confirmation-signature protocol.
//!
//! ## State Transition Rules
//!
//! The same table drives startup replay and live assembly.
//!
//! | Type | Spend condition | Create condition | Effect |
//! |------|-----------------|------------------|--------|
//! | DEPOSIT | none | creatable output | create output |
//! | MERGE | both inputs live | creatable output | spend both, create merged output |
//! | WITHDRAW | input live | none | spend input |
//! | NORMAL | every present input live | creatable output | spend inputs, create outputs |
//!
//! A NORMAL transaction's spend is applied when it is admitted to the pool;
//! its outputs are created when it is drained into a block.
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Conservation: consumed == outputs + fee | `rules::is_valid_transaction` |
//! | No double spend | spend at admission under the state mutex |
//! | Spends need the originating block's confirmation | `UtxoPlasmaChain::submit_transaction` |
//! | At most 256 slots per block | pool drain |
//! | Replay is deterministic | `rules::apply_transaction` |
//!
//! ## Concurrency
//!
//! One `tokio::sync::Mutex` serializes block assembly and admission. A
//! second caller waits for the first rather than being dropped.

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::ChainConfig;
pub use domain::rules::{apply_transaction, can_create, can_spend, is_valid_transaction, UtxoDelta};
pub use domain::utxo_set::UtxoSet;
pub use error::{ChainError, Result};
pub use service::{ReplaySummary, TransactionProof, TxHashRoot, UtxoPlasmaChain};

/// First block number at or after the interval boundary following `head`.
///
/// `floor(head / interval) * interval + interval`. `interval` must be non-zero.
pub fn next_block_number(head: u64, interval: u64) -> u64 {
    (head / interval) * interval + interval
}
