//! Persisted record forms.
//!
//! Hex fields are lowercase and `0x`-prefixed. Amounts are decimal strings.
//! Converting a record back into an entity recomputes the merkle root and the
//! slot hashes and rejects the record if they disagree.

use super::block::{Block, BlockHeader};
use super::confirmation::ConfirmationSignature;
use super::errors::{LedgerError, Result};
use super::utxo::Utxo;
use serde::{Deserialize, Serialize};
use shared_crypto::keccak256;
use shared_types::{hex_util, Signature, TxType, UtxoPosition, U256};

/// Header part of a [`BlockRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeaderRecord {
    pub block_number: u64,
    pub previous_hash: String,
    /// Empty for genesis.
    pub merkle_root: String,
    /// Merkle leaf preimages of the occupied slots.
    pub data: Vec<String>,
    pub sig_r: String,
    pub sig_s: String,
    pub sig_v: String,
    pub timestamp: u64,
}

/// A block as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub block_header: BlockHeaderRecord,
    pub hashes: Vec<String>,
    pub transactions: Vec<String>,
    /// `None` for an unconfirmed slot.
    pub confirmations: Vec<Option<ConfirmationSignature>>,
    pub types: Vec<u8>,
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        let header = &block.header;
        let (sig_r, sig_s, sig_v) = match &header.signature {
            Some(sig) => (
                hex_util::to_hex(&sig.r()),
                hex_util::to_hex(&sig.s()),
                format!("{:02x}", sig.v()),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        Self {
            block_header: BlockHeaderRecord {
                block_number: header.block_number,
                previous_hash: hex_util::to_hex(&header.previous_hash),
                merkle_root: header
                    .merkle_root
                    .map(|root| hex_util::to_hex(&root))
                    .unwrap_or_default(),
                data: header.leaves.iter().map(|l| hex_util::to_hex(l)).collect(),
                sig_r,
                sig_s,
                sig_v,
                timestamp: header.timestamp,
            },
            hashes: block.hashes.iter().map(|h| hex_util::to_hex(h)).collect(),
            transactions: block
                .transactions
                .iter()
                .map(|t| hex_util::to_hex(t))
                .collect(),
            confirmations: block.confirmations.clone(),
            types: block.types.iter().map(|t| t.as_u8()).collect(),
        }
    }
}

impl TryFrom<BlockRecord> for Block {
    type Error = LedgerError;

    fn try_from(record: BlockRecord) -> Result<Self> {
        let hr = record.block_header;
        let previous_hash = hex_util::parse_hash(&hr.previous_hash)?;
        let leaves = hr
            .data
            .iter()
            .map(|d| hex_util::decode(d))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut header = BlockHeader::new(hr.block_number, previous_hash, leaves)?;
        let stored_root = if hr.merkle_root.is_empty() {
            None
        } else {
            Some(hex_util::parse_hash(&hr.merkle_root)?)
        };
        if stored_root != header.merkle_root {
            return Err(LedgerError::InvalidRecord(format!(
                "block {} merkle root does not match its data",
                hr.block_number
            )));
        }

        if !hr.sig_r.is_empty() {
            let r = hex_util::parse_hash(&hr.sig_r)?;
            let s = hex_util::parse_hash(&hr.sig_s)?;
            let v = u8::from_str_radix(hex_util::strip_prefix(&hr.sig_v), 16).map_err(|_| {
                LedgerError::InvalidRecord(format!("invalid sigV {:?}", hr.sig_v))
            })?;
            header.set_signature(Signature::from_parts(&r, &s, v));
        }
        header.timestamp = hr.timestamp;

        let transactions = record
            .transactions
            .iter()
            .map(|t| hex_util::decode(t))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let hashes = record
            .hashes
            .iter()
            .map(|h| hex_util::parse_hash(h))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let types = record
            .types
            .iter()
            .map(|t| TxType::try_from(*t))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let count = transactions.len();
        if hashes.len() != count || types.len() != count || record.confirmations.len() > count {
            return Err(LedgerError::InvalidRecord(format!(
                "block {} slot arrays disagree: {} txs, {} hashes, {} types, {} confirmations",
                hr.block_number,
                count,
                hashes.len(),
                types.len(),
                record.confirmations.len()
            )));
        }
        if transactions
            .iter()
            .zip(&hashes)
            .any(|(wire, hash)| keccak256(wire) != *hash)
        {
            return Err(LedgerError::InvalidRecord(format!(
                "block {} slot hash does not match its wire data",
                hr.block_number
            )));
        }

        let mut confirmations = record.confirmations;
        confirmations.resize(count, None);

        Ok(Block {
            header,
            transactions,
            hashes,
            confirmations,
            types,
        })
    }
}

/// A UTXO as stored, with its spent flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoRecord {
    pub blk_num: u64,
    pub tx_index: u32,
    pub o_index: u8,
    pub owner: String,
    pub token: String,
    /// Decimal amount in the smallest unit.
    pub denom: String,
    pub spent: bool,
}

impl UtxoRecord {
    pub fn from_utxo(utxo: &Utxo, spent: bool) -> Self {
        Self {
            blk_num: utxo.position.blk_num,
            tx_index: utxo.position.tx_index,
            o_index: utxo.position.o_index,
            owner: hex_util::to_hex(&utxo.owner),
            token: hex_util::to_hex(&utxo.token),
            denom: utxo.amount.to_string(),
            spent,
        }
    }

    pub fn to_utxo(&self) -> Result<Utxo> {
        let amount = U256::from_dec_str(&self.denom)
            .map_err(|_| LedgerError::InvalidRecord(format!("invalid denom {:?}", self.denom)))?;
        Ok(Utxo::new(
            UtxoPosition::new(self.blk_num, self.tx_index, self.o_index),
            hex_util::parse_address(&self.owner)?,
            amount,
            hex_util::parse_address(&self.token)?,
        ))
    }
}
