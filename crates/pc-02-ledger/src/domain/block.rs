//! # Block & Block Header
//!
//! A block is a header plus up to [`BLOCK_CAPACITY`] transaction slots. Each
//! slot has a wire blob, the blob's hash, a type tag and an optional
//! confirmation signature.

use super::codec::split_wire;
use super::confirmation::ConfirmationSignature;
use super::errors::{LedgerError, Result};
use super::transaction::Transaction;
use pc_01_merkle::{MerkleProof, MerkleTree};
use shared_crypto::{keccak256, recover_message, Secp256k1KeyPair};
use shared_types::{
    Address, Hash, Signature, TxType, BLOCK_CAPACITY, GENESIS_PREVIOUS_HASH,
};

/// Width of the block number field in the header encoding.
const BLOCK_NUMBER_WIDTH: usize = 32;

/// Signed commitment to a block's slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub block_number: u64,
    pub previous_hash: Hash,
    /// `None` only for genesis.
    pub merkle_root: Option<Hash>,
    /// Merkle leaf preimages of the occupied slots.
    pub leaves: Vec<Vec<u8>>,
    pub signature: Option<Signature>,
    pub timestamp: u64,
}

impl BlockHeader {
    /// Build a header, committing to `leaves` padded to the block capacity.
    ///
    /// Leaves beyond the capacity are dropped.
    pub fn new(block_number: u64, previous_hash: Hash, mut leaves: Vec<Vec<u8>>) -> Result<Self> {
        leaves.truncate(BLOCK_CAPACITY);
        let merkle_root = if block_number == 0 {
            None
        } else {
            Some(MerkleTree::build_fixed(&leaves, BLOCK_CAPACITY)?.root())
        };
        Ok(Self {
            block_number,
            previous_hash,
            merkle_root,
            leaves,
            signature: None,
            timestamp: crate::now_millis(),
        })
    }

    /// Unsigned genesis header.
    pub fn genesis() -> Self {
        Self {
            block_number: 0,
            previous_hash: GENESIS_PREVIOUS_HASH,
            merkle_root: None,
            leaves: Vec::new(),
            signature: None,
            timestamp: crate::now_millis(),
        }
    }

    /// `be32(number) || previous_hash || root`, plus `r || s || v` when
    /// `include_signature` is set and the header is signed.
    pub fn encode(&self, include_signature: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCK_NUMBER_WIDTH + 32 + 32 + 65);
        let mut number = [0u8; BLOCK_NUMBER_WIDTH];
        number[BLOCK_NUMBER_WIDTH - 8..].copy_from_slice(&self.block_number.to_be_bytes());
        out.extend_from_slice(&number);
        out.extend_from_slice(&self.previous_hash);
        if let Some(root) = &self.merkle_root {
            out.extend_from_slice(root);
        }
        if include_signature {
            if let Some(sig) = &self.signature {
                out.extend_from_slice(sig.as_bytes());
            }
        }
        out
    }

    /// `keccak(encode(true))`. The next block's `previous_hash`.
    pub fn hash(&self) -> Hash {
        keccak256(&self.encode(true))
    }

    /// Store a signature, normalizing `v` to 27/28.
    pub fn set_signature(&mut self, sig: Signature) {
        let v = if sig.v() < 27 { sig.v() + 27 } else { sig.v() };
        self.signature = Some(Signature::from_parts(&sig.r(), &sig.s(), v));
    }

    /// Personal-sign `encode(false)` with the operator key.
    pub fn sign(&mut self, key: &Secp256k1KeyPair) -> Result<()> {
        let sig = key.sign_message(&self.encode(false))?;
        self.set_signature(sig);
        Ok(())
    }

    /// Address that signed this header.
    pub fn signer(&self) -> Result<Option<Address>> {
        match &self.signature {
            Some(sig) => Ok(Some(recover_message(&self.encode(false), sig)?)),
            None => Ok(None),
        }
    }

    /// Rebuild the full capacity-wide merkle tree.
    pub fn merkle_tree(&self) -> Result<MerkleTree> {
        if self.merkle_root.is_none() {
            return Err(LedgerError::MissingRoot(self.block_number));
        }
        Ok(MerkleTree::build_fixed(&self.leaves, BLOCK_CAPACITY)?)
    }
}

/// A header and its transaction slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    /// Wire blob of each slot.
    pub transactions: Vec<Vec<u8>>,
    /// `keccak(wire)` of each slot.
    pub hashes: Vec<Hash>,
    pub confirmations: Vec<Option<ConfirmationSignature>>,
    pub types: Vec<TxType>,
}

impl Block {
    /// Assemble an unsigned block from transactions, in slot order.
    pub fn new(block_number: u64, previous_hash: Hash, txs: &[Transaction]) -> Result<Self> {
        if txs.len() > BLOCK_CAPACITY {
            return Err(LedgerError::TooManyTransactions {
                count: txs.len(),
                capacity: BLOCK_CAPACITY,
            });
        }

        let leaves = txs.iter().map(Transaction::merkle_leaf).collect();
        let header = BlockHeader::new(block_number, previous_hash, leaves)?;
        let transactions = txs.iter().map(Transaction::wire_data).collect();
        let hashes = txs.iter().map(Transaction::wire_hash).collect();

        Ok(Self {
            header,
            transactions,
            hashes,
            confirmations: vec![None; txs.len()],
            types: txs.iter().map(|tx| tx.tx_type).collect(),
        })
    }

    pub fn genesis() -> Self {
        Self {
            header: BlockHeader::genesis(),
            transactions: Vec::new(),
            hashes: Vec::new(),
            confirmations: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn number(&self) -> u64 {
        self.header.block_number
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn previous_hash(&self) -> Hash {
        self.header.previous_hash
    }

    pub fn merkle_root(&self) -> Option<Hash> {
        self.header.merkle_root
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn sign(&mut self, key: &Secp256k1KeyPair) -> Result<()> {
        self.header.sign(key)
    }

    fn check_slot(&self, index: usize) -> Result<()> {
        if index >= self.transactions.len() {
            return Err(LedgerError::SlotOutOfRange {
                index,
                len: self.transactions.len(),
            });
        }
        Ok(())
    }

    /// Decode the transaction in slot `index`.
    pub fn transaction(&self, index: usize) -> Result<Transaction> {
        self.check_slot(index)?;
        let tx_type = self.types.get(index).copied().unwrap_or(TxType::Normal);
        let mut tx = Transaction::decode(&self.transactions[index], tx_type)?;
        tx.timestamp = self.header.timestamp;
        Ok(tx)
    }

    /// Decode every slot, in order.
    pub fn decoded_transactions(&self) -> Result<Vec<Transaction>> {
        (0..self.len()).map(|i| self.transaction(i)).collect()
    }

    /// `keccak(body)` of slot `index`: the hash its signers signed.
    pub fn tx_hash(&self, index: usize) -> Result<Hash> {
        self.check_slot(index)?;
        let parts = split_wire(&self.transactions[index])?;
        Ok(keccak256(parts.body))
    }

    /// Both slot signatures of slot `index`, `None` where zero.
    pub fn slot_signatures(&self, index: usize) -> Result<[Option<Signature>; 2]> {
        self.check_slot(index)?;
        let parts = split_wire(&self.transactions[index])?;
        Ok([parts.sig1.non_zero(), parts.sig2.non_zero()])
    }

    /// Slot whose wire hash is `wire_hash`.
    pub fn slot_of(&self, wire_hash: &Hash) -> Option<usize> {
        self.hashes.iter().position(|h| h == wire_hash)
    }

    pub fn set_confirmation(&mut self, index: usize, confirmation: ConfirmationSignature) -> Result<()> {
        self.check_slot(index)?;
        self.confirmations[index] = Some(confirmation);
        Ok(())
    }

    pub fn confirmation(&self, index: usize) -> Option<ConfirmationSignature> {
        self.confirmations.get(index).copied().flatten()
    }

    /// Inclusion proof of slot `index` against the header root.
    pub fn proof(&self, index: usize) -> Result<MerkleProof> {
        self.check_slot(index)?;
        Ok(self.header.merkle_tree()?.proof(index)?)
    }
}
