//! # Confirmation Signatures
//!
//! After a block is anchored, the owner of each consumed input cosigns
//! `keccak(tx_hash || block_root)`. A spend of one of that transaction's
//! outputs is only accepted once this confirmation exists.

use super::errors::{LedgerError, Result};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use shared_crypto::{keccak256_concat, recover_message, Secp256k1KeyPair};
use shared_types::{hex_util, Hash, Signature, TypeError, SIGNATURE_LENGTH};
use std::fmt;
use std::str::FromStr;

/// Confirmation for both input slots of one transaction.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationSignature {
    pub first: Signature,
    pub second: Option<Signature>,
}

impl ConfirmationSignature {
    /// Width of the wire form.
    pub const WIRE_LENGTH: usize = 2 * SIGNATURE_LENGTH;

    pub fn new(first: Signature, second: Option<Signature>) -> Self {
        Self { first, second }
    }

    /// `first || second`, with the zero sentinel for a missing second half.
    pub fn to_bytes(&self) -> [u8; Self::WIRE_LENGTH] {
        let mut out = [0u8; Self::WIRE_LENGTH];
        out[..SIGNATURE_LENGTH].copy_from_slice(self.first.as_bytes());
        if let Some(second) = &self.second {
            out[SIGNATURE_LENGTH..].copy_from_slice(second.as_bytes());
        }
        out
    }

    /// Accepts the 130-byte wire form, or 65 bytes meaning "first half only".
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            SIGNATURE_LENGTH => Ok(Self::new(Signature::from_slice(bytes)?, None)),
            Self::WIRE_LENGTH => Ok(Self::new(
                Signature::from_slice(&bytes[..SIGNATURE_LENGTH])?,
                Signature::from_slice(&bytes[SIGNATURE_LENGTH..])?.non_zero(),
            )),
            actual => Err(LedgerError::Type(TypeError::InvalidLength {
                what: "confirmation signature",
                expected: Self::WIRE_LENGTH,
                actual,
            })),
        }
    }

    pub fn to_hex(&self) -> String {
        hex_util::to_hex(&self.to_bytes())
    }
}

impl fmt::Debug for ConfirmationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfirmationSignature({})", self.to_hex())
    }
}

impl FromStr for ConfirmationSignature {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slice(&hex_util::decode(s)?)
    }
}

impl Serialize for ConfirmationSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ConfirmationSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// `keccak(tx_hash || root)`.
pub fn confirmation_hash(tx_hash: &Hash, root: &Hash) -> Hash {
    keccak256_concat(&[tx_hash.as_slice(), root.as_slice()])
}

/// Personal-sign the confirmation hash.
pub fn sign_confirmation(tx_hash: &Hash, root: &Hash, key: &Secp256k1KeyPair) -> Result<Signature> {
    Ok(key.sign_message(&confirmation_hash(tx_hash, root))?)
}

/// True when each confirmation half was produced by the same key that signed
/// the corresponding input slot. Slot 2 is only checked when `sig2` is
/// present and non-zero. Any recovery failure yields `false`.
pub fn is_valid_confirm_sig(
    tx_hash: &Hash,
    root: &Hash,
    sig1: &Signature,
    sig2: Option<&Signature>,
    confirmation: &ConfirmationSignature,
) -> bool {
    let conf_hash = confirmation_hash(tx_hash, root);

    let same_signer = |tx_sig: &Signature, conf_sig: &Signature| -> bool {
        match (
            recover_message(&conf_hash, conf_sig),
            recover_message(tx_hash, tx_sig),
        ) {
            (Ok(confirmer), Ok(spender)) => confirmer == spender,
            _ => false,
        }
    };

    if !same_signer(sig1, &confirmation.first) {
        return false;
    }

    match sig2.filter(|s| !s.is_zero()) {
        Some(sig2) => match &confirmation.second {
            Some(second) => same_signer(sig2, second),
            None => false,
        },
        None => true,
    }
}
