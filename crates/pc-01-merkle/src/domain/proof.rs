//! Inclusion proofs and their byte form.

use super::errors::MerkleError;
use serde::{Deserialize, Serialize};
use shared_crypto::{keccak256, keccak256_concat};
use shared_types::{hex_util, Hash};

/// Width of one proof node in byte form: direction byte plus sibling hash.
pub const PROOF_NODE_LENGTH: usize = 33;

/// Position of a sibling in the Merkle tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiblingPosition {
    /// Sibling is the left child; the walked node is on the right.
    Left,
    /// Sibling is the right child; the walked node is on the left.
    Right,
}

impl SiblingPosition {
    /// Direction byte in the proof byte form.
    pub fn direction_byte(self) -> u8 {
        match self {
            SiblingPosition::Left => 0x00,
            SiblingPosition::Right => 0x01,
        }
    }

    /// Inverse of [`SiblingPosition::direction_byte`].
    pub fn from_direction_byte(byte: u8) -> Result<Self, MerkleError> {
        match byte {
            0x00 => Ok(SiblingPosition::Left),
            0x01 => Ok(SiblingPosition::Right),
            other => Err(MerkleError::InvalidDirection(other)),
        }
    }
}

/// A single node in the Merkle proof path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    /// The sibling hash at this level.
    pub hash: Hash,
    /// Position of sibling (left or right).
    pub position: SiblingPosition,
}

/// Leaf-to-root inclusion proof for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Path of sibling hashes from leaf to root.
    pub path: Vec<ProofNode>,
}

impl MerkleProof {
    /// Recompute the root from a leaf hash and compare.
    pub fn verify(&self, leaf_hash: &Hash, expected_root: &Hash) -> bool {
        self.compute_root(leaf_hash) == *expected_root
    }

    /// Same as [`MerkleProof::verify`] but hashes the preimage first.
    pub fn verify_preimage(&self, preimage: &[u8], expected_root: &Hash) -> bool {
        self.verify(&keccak256(preimage), expected_root)
    }

    /// Root implied by this proof for `leaf_hash`.
    pub fn compute_root(&self, leaf_hash: &Hash) -> Hash {
        self.path.iter().fold(*leaf_hash, |current, node| match node.position {
            SiblingPosition::Left => hash_pair(&node.hash, &current),
            SiblingPosition::Right => hash_pair(&current, &node.hash),
        })
    }

    /// Byte form: per level, direction byte then sibling.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.path.len() * PROOF_NODE_LENGTH);
        for node in &self.path {
            out.push(node.position.direction_byte());
            out.extend_from_slice(&node.hash);
        }
        out
    }

    /// Parse the byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MerkleError> {
        if bytes.len() % PROOF_NODE_LENGTH != 0 {
            return Err(MerkleError::InvalidProofLength(bytes.len()));
        }
        let path = bytes
            .chunks_exact(PROOF_NODE_LENGTH)
            .map(|chunk| {
                let position = SiblingPosition::from_direction_byte(chunk[0])?;
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&chunk[1..]);
                Ok(ProofNode { hash, position })
            })
            .collect::<Result<Vec<_>, MerkleError>>()?;
        Ok(Self { path })
    }

    /// `0x`-prefixed hex of the byte form.
    pub fn to_hex(&self) -> String {
        hex_util::to_hex(&self.to_bytes())
    }

    /// Number of levels walked.
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// `keccak256(left || right)`.
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    keccak256_concat(&[left.as_slice(), right.as_slice()])
}
