//! Tree construction.

use super::errors::MerkleError;
use super::proof::{hash_pair, MerkleProof, ProofNode, SiblingPosition};
use shared_crypto::keccak256;
use shared_types::Hash;

/// A binary Keccak-256 tree stored level by level, leaves first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaf hashes, the last level holds the root.
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree from leaf preimages.
    pub fn build<T: AsRef<[u8]>>(preimages: &[T]) -> Result<Self, MerkleError> {
        let leaves = preimages.iter().map(|p| keccak256(p.as_ref())).collect();
        Self::from_leaf_hashes(leaves)
    }

    /// Build a tree of exactly `width` leaves: extra preimages are dropped
    /// and missing ones are filled with the empty preimage.
    pub fn build_fixed<T: AsRef<[u8]>>(preimages: &[T], width: usize) -> Result<Self, MerkleError> {
        let empty = keccak256(&[]);
        let mut leaves: Vec<Hash> = preimages
            .iter()
            .take(width)
            .map(|p| keccak256(p.as_ref()))
            .collect();
        leaves.resize(width, empty);
        Self::from_leaf_hashes(leaves)
    }

    /// Build a tree from already-hashed leaves.
    pub fn from_leaf_hashes(leaves: Vec<Hash>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::Empty);
        }

        let mut levels = vec![leaves];
        loop {
            let current = &levels[levels.len() - 1];
            if current.len() == 1 {
                break;
            }
            if current.len() % 2 != 0 {
                return Err(MerkleError::OddLevel {
                    level: levels.len() - 1,
                    count: current.len(),
                });
            }
            let next: Vec<Hash> = current
                .chunks_exact(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// Root hash.
    pub fn root(&self) -> Hash {
        // levels is never empty and the last level always has one node
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Leaf hash at `index`.
    pub fn leaf(&self, index: usize) -> Option<Hash> {
        self.levels[0].get(index).copied()
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        if index >= self.leaf_count() {
            return Err(MerkleError::InvalidIndex {
                index,
                count: self.leaf_count(),
            });
        }

        let mut path = Vec::with_capacity(self.levels.len() - 1);
        let mut current = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let (sibling, position) = if current % 2 == 1 {
                (current - 1, SiblingPosition::Left)
            } else {
                (current + 1, SiblingPosition::Right)
            };
            path.push(ProofNode {
                hash: level[sibling],
                position,
            });
            current /= 2;
        }

        Ok(MerkleProof { path })
    }
}
