//! Hex conversions used at the record, log and configuration edges.
//!
//! Output is always lowercase with a `0x` prefix. Input accepts either case,
//! with or without the prefix.

use crate::entities::{Address, Hash};
use crate::errors::TypeError;

/// Strip an optional `0x`/`0X` prefix.
pub fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Lowercase `0x`-prefixed hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode hex of any length.
pub fn decode(s: &str) -> Result<Vec<u8>, TypeError> {
    hex::decode(strip_prefix(s)).map_err(|e| TypeError::InvalidHex(e.to_string()))
}

fn decode_fixed<const N: usize>(s: &str, what: &'static str) -> Result<[u8; N], TypeError> {
    let bytes = decode(s)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| TypeError::InvalidLength {
            what,
            expected: N,
            actual: bytes.len(),
        })
}

/// Parse a 20-byte address.
pub fn parse_address(s: &str) -> Result<Address, TypeError> {
    decode_fixed::<20>(s, "address")
}

/// Parse a 32-byte hash.
pub fn parse_hash(s: &str) -> Result<Hash, TypeError> {
    decode_fixed::<32>(s, "hash")
}
