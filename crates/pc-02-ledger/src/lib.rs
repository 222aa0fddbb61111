//! # Ledger Entities
//!
//! The value types every other Plasma-Chain crate moves around.
//!
//! ## Byte Forms of a Transaction
//!
//! | Form | Layout | Used for |
//! |------|--------|----------|
//! | body | `rlp([blk1, tx1, o1, blk2, tx2, o2, owner1, denom1, owner2, denom2, fee, token])` | hash preimage |
//! | wire | `body \|\| sig1 \|\| sig2` | block slot, storage, submission |
//! | merkle leaf | `keccak(body) \|\| sig1 \|\| sig2` | block merkle tree |
//!
//! An absent signature is 65 zero bytes on the wire. Inside the crate every
//! optional part (input, output, signature) is an `Option`.
//!
//! ## Blocks
//!
//! A block holds up to 256 slots. Its header commits to the merkle root of
//! the slot leaves (padded to 256 with the empty preimage) and is signed by
//! the operator. The next block links to `keccak(header.encode(true))`.

pub mod domain;

pub use domain::block::{Block, BlockHeader};
pub use domain::confirmation::{
    confirmation_hash, is_valid_confirm_sig, sign_confirmation, ConfirmationSignature,
};
pub use domain::errors::{LedgerError, Result};
pub use domain::records::{BlockHeaderRecord, BlockRecord, UtxoRecord};
pub use domain::transaction::{Transaction, TxOutput};
pub use domain::utxo::{Utxo, UtxoKey};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
