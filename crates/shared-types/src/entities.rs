//! # Core Domain Entities
//!
//! Primitive entities shared by the ledger, storage, anchor and chain crates.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `Address`, `Signature`
//! - **Ledger**: `TxType`, `UtxoPosition`
//! - **Chain constants**: genesis linkage, capacity, signature width

use crate::errors::TypeError;
use crate::hex_util;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// The zero address. Used as the native-asset token sentinel.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Token address of the native asset.
pub const NATIVE_TOKEN: Address = ZERO_ADDRESS;

/// Width of a recoverable secp256k1 signature (`r || s || v`).
pub const SIGNATURE_LENGTH: usize = 65;

/// Previous-hash value carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: Hash = [
    0x2a, 0x5e, 0xed, 0x31, 0x1e, 0xe0, 0x70, 0x74, 0xf2, 0x39, 0x6d, 0x20, 0xef, 0xbd, 0x59, 0xf4,
    0xe9, 0x42, 0x2b, 0x6c, 0xa4, 0x86, 0xe7, 0x1a, 0x97, 0x48, 0x5e, 0x52, 0x03, 0x42, 0x3c, 0xf2,
];

/// Number of transaction slots in every block.
pub const BLOCK_CAPACITY: usize = 256;

/// A recoverable secp256k1 signature in `r (32) || s (32) || v (1)` layout.
///
/// The all-zero value is the wire sentinel for "no signature". Domain code
/// should carry `Option<Signature>` and call [`Signature::non_zero`] when
/// reading wire data.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    /// The zero sentinel.
    pub const ZERO: Signature = Signature([0u8; SIGNATURE_LENGTH]);

    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse from a slice, which must be exactly 65 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; SIGNATURE_LENGTH] =
            bytes.try_into().map_err(|_| TypeError::InvalidLength {
                what: "signature",
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Assemble from components.
    pub fn from_parts(r: &[u8; 32], s: &[u8; 32], v: u8) -> Self {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..32].copy_from_slice(r);
        bytes[32..64].copy_from_slice(s);
        bytes[64] = v;
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// The `r` component.
    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.0[..32]);
        r
    }

    /// The `s` component.
    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.0[32..64]);
        s
    }

    /// The recovery byte.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// True for the zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// `None` for the zero sentinel, `Some(self)` otherwise.
    pub fn non_zero(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self)
        }
    }

    /// `0x`-prefixed hex form.
    pub fn to_hex(&self) -> String {
        hex_util::to_hex(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Signature {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(&hex_util::decode(s)?)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// =============================================================================
// CLUSTER B: LEDGER
// =============================================================================

/// Transaction type tag, persisted alongside every block slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TxType {
    /// User transfer signed by the input owners.
    Normal = 0,
    /// Operator-synthesized credit of a root-ledger deposit.
    Deposit = 1,
    /// Operator-synthesized removal of an exited output.
    Withdraw = 2,
    /// Operator-synthesized combination of two same-owner outputs.
    Merge = 3,
}

impl TxType {
    /// Numeric tag.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// True for types the operator builds and signs itself.
    pub fn is_operator_synthesized(self) -> bool {
        !matches!(self, TxType::Normal)
    }
}

impl TryFrom<u8> for TxType {
    type Error = TypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TxType::Normal),
            1 => Ok(TxType::Deposit),
            2 => Ok(TxType::Withdraw),
            3 => Ok(TxType::Merge),
            other => Err(TypeError::UnknownTxType(other)),
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxType::Normal => "NORMAL",
            TxType::Deposit => "DEPOSIT",
            TxType::Withdraw => "WITHDRAW",
            TxType::Merge => "MERGE",
        };
        f.write_str(name)
    }
}

/// Multiplier applied to the block number in an encoded UTXO position.
pub const POSITION_BLOCK_FACTOR: u128 = 1_000_000_000;

/// Multiplier applied to the transaction index in an encoded UTXO position.
pub const POSITION_TX_FACTOR: u128 = 10_000;

/// Location of a transaction output: block number, slot and output index.
///
/// Also used as an input reference, since an input names the output it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoPosition {
    /// Block containing the creating transaction.
    pub blk_num: u64,
    /// Slot of the creating transaction within the block.
    pub tx_index: u32,
    /// Output index within the creating transaction.
    pub o_index: u8,
}

impl UtxoPosition {
    /// Create a position.
    pub fn new(blk_num: u64, tx_index: u32, o_index: u8) -> Self {
        Self {
            blk_num,
            tx_index,
            o_index,
        }
    }

    /// Encode as `blk * 1_000_000_000 + tx_index * 10_000 + o_index`.
    pub fn encode(&self) -> u128 {
        u128::from(self.blk_num) * POSITION_BLOCK_FACTOR
            + u128::from(self.tx_index) * POSITION_TX_FACTOR
            + u128::from(self.o_index)
    }

    /// Inverse of [`UtxoPosition::encode`].
    pub fn decode(pos: u128) -> Result<Self, TypeError> {
        let blk_num = pos / POSITION_BLOCK_FACTOR;
        let rest = pos % POSITION_BLOCK_FACTOR;
        let tx_index = rest / POSITION_TX_FACTOR;
        let o_index = rest % POSITION_TX_FACTOR;

        let blk_num = u64::try_from(blk_num).map_err(|_| TypeError::PositionOutOfRange(pos))?;
        let tx_index = u32::try_from(tx_index).map_err(|_| TypeError::PositionOutOfRange(pos))?;
        let o_index = u8::try_from(o_index).map_err(|_| TypeError::PositionOutOfRange(pos))?;

        Ok(Self {
            blk_num,
            tx_index,
            o_index,
        })
    }
}

impl fmt::Display for UtxoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.blk_num, self.tx_index, self.o_index)
    }
}
