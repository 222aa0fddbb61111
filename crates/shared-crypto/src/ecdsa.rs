//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable ECDSA signatures in the `r || s || v` layout, with `v` in
//! `{27, 28}`. Signers are identified by their 20-byte address, derived as
//! the last 20 bytes of `keccak256(uncompressed_pubkey[1..])`.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2)
//! - Secret key bytes zeroized on drop

use crate::hashing::{eth_message_hash, keccak256};
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use shared_types::{hex_util, Address, Hash, Signature};
use zeroize::Zeroize;

/// Offset added to the raw recovery id in the `v` byte.
const V_OFFSET: u8 = 27;

/// secp256k1 ECDSA keypair.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create from a hex secret key, with or without `0x`.
    pub fn from_hex(secret: &str) -> Result<Self, CryptoError> {
        let mut raw = hex::decode(hex_util::strip_prefix(secret.trim()))
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        let result = match <[u8; 32]>::try_from(raw.as_slice()) {
            Ok(mut bytes) => {
                let pair = Self::from_bytes(bytes);
                bytes.zeroize();
                pair
            }
            Err(_) => Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: raw.len(),
            }),
        };
        raw.zeroize();
        result
    }

    /// Address controlled by this key.
    pub fn address(&self) -> Address {
        address_from_pubkey(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest as-is.
    pub fn sign_prehash(&self, digest: &Hash) -> Result<Signature, CryptoError> {
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Signature::from_parts(
            &r,
            &s,
            recovery_id.to_byte() + V_OFFSET,
        ))
    }

    /// Sign `message` under the personal-message prefix.
    pub fn sign_message(&self, message: &[u8]) -> Result<Signature, CryptoError> {
        self.sign_prehash(&eth_message_hash(message))
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &hex_util::to_hex(&self.address()))
            .finish_non_exhaustive()
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        // Zeroize secret key material
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

/// Recover the signer address of a signature over a 32-byte digest.
pub fn recover_prehash(digest: &Hash, signature: &Signature) -> Result<Address, CryptoError> {
    let recovery_id = parse_recovery_id(signature.v())?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(&signature.as_bytes()[..64]);
    let sig = K256Signature::from_slice(&sig_bytes).map_err(|_| CryptoError::InvalidSignature);
    sig_bytes.zeroize();
    let sig = sig?;

    let recovered = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(address_from_pubkey(&recovered))
}

/// Recover the signer address of a personal-message signature.
pub fn recover_message(message: &[u8], signature: &Signature) -> Result<Address, CryptoError> {
    recover_prehash(&eth_message_hash(message), signature)
}

fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, CryptoError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(CryptoError::InvalidRecoveryId(v)),
    };
    RecoveryId::from_byte(id).ok_or(CryptoError::InvalidRecoveryId(v))
}
