//! # Shared Crypto - Operator and User Signing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Transaction, header and merkle hashing |
//! | `ecdsa` | secp256k1 (recoverable) | Transaction, header and confirmation signing |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **Personal-message prefix**: every signature is taken over
//!   `keccak256("\x19Ethereum Signed Message:\n" || len || msg)`, so a root
//!   ledger contract can verify it with `ecrecover`.
//! - **Key hygiene**: secret bytes are zeroized when a keypair is dropped.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{recover_message, recover_prehash, Secp256k1KeyPair};
pub use errors::CryptoError;
pub use hashing::{eth_message_hash, keccak256, keccak256_concat, EMPTY_KECCAK};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
