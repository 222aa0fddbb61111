//! Ledger domain: entities, codec and persisted record forms.

pub mod block;
pub mod codec;
pub mod confirmation;
pub mod errors;
pub mod records;
pub mod transaction;
pub mod utxo;
