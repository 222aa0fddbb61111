//! Unspent outputs and their canonical key.

use super::errors::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use shared_types::{hex_util, Address, UtxoPosition, U256};
use std::fmt;

/// Canonical UTXO key: position plus token.
///
/// Ordering is by block, slot, output index, then token, which is also the
/// order in which an owner's UTXOs are picked for spending and merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoKey {
    pub position: UtxoPosition,
    pub token: Address,
}

impl UtxoKey {
    /// Width of [`UtxoKey::to_bytes`].
    pub const ENCODED_LENGTH: usize = 8 + 4 + 1 + 20;

    pub fn new(position: UtxoPosition, token: Address) -> Self {
        Self { position, token }
    }

    /// Big-endian, order-preserving byte form used as a storage key suffix.
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LENGTH] {
        let mut out = [0u8; Self::ENCODED_LENGTH];
        out[..8].copy_from_slice(&self.position.blk_num.to_be_bytes());
        out[8..12].copy_from_slice(&self.position.tx_index.to_be_bytes());
        out[12] = self.position.o_index;
        out[13..].copy_from_slice(&self.token);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::ENCODED_LENGTH {
            return Err(LedgerError::InvalidRecord(format!(
                "utxo key must be {} bytes, got {}",
                Self::ENCODED_LENGTH,
                bytes.len()
            )));
        }
        let mut blk = [0u8; 8];
        blk.copy_from_slice(&bytes[..8]);
        let mut tx = [0u8; 4];
        tx.copy_from_slice(&bytes[8..12]);
        let mut token = [0u8; 20];
        token.copy_from_slice(&bytes[13..]);
        Ok(Self {
            position: UtxoPosition::new(u64::from_be_bytes(blk), u32::from_be_bytes(tx), bytes[12]),
            token,
        })
    }
}

impl fmt::Display for UtxoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.position, hex_util::to_hex(&self.token))
    }
}

/// A live transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub position: UtxoPosition,
    pub owner: Address,
    pub amount: U256,
    pub token: Address,
}

impl Utxo {
    pub fn new(position: UtxoPosition, owner: Address, amount: U256, token: Address) -> Self {
        Self {
            position,
            owner,
            amount,
            token,
        }
    }

    pub fn key(&self) -> UtxoKey {
        UtxoKey::new(self.position, self.token)
    }
}
