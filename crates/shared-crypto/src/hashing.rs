//! # Keccak-256 Hashing
//!
//! Every hash on the chain is Keccak-256: transaction hashes, merkle nodes,
//! header hashes and confirmation hashes.

use sha3::{Digest, Keccak256};
use shared_types::Hash;

/// `keccak256("")`. Fills empty merkle slots.
pub const EMPTY_KECCAK: Hash = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
];

/// Prefix of the personal-message signing scheme.
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 of the concatenation of `parts`, without allocating.
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Personal-message digest: `keccak256(prefix || decimal(len) || message)`.
pub fn eth_message_hash(message: &[u8]) -> Hash {
    let len = message.len().to_string();
    keccak256_concat(&[PERSONAL_MESSAGE_PREFIX, len.as_bytes(), message])
}
