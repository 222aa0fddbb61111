//! RLP field helpers and the positional wire split.
//!
//! Numeric fields use canonical RLP: no leading zeros, and the empty string
//! decodes as zero.

use super::errors::{LedgerError, Result};
use rlp::{Decodable, Rlp};
use shared_types::{Address, Signature, U256, SIGNATURE_LENGTH};

/// Number of fields in a transaction body.
pub const BODY_FIELD_COUNT: usize = 12;

/// Bytes of trailing signatures on every wire blob.
pub const WIRE_SIGNATURES_LENGTH: usize = 2 * SIGNATURE_LENGTH;

/// A wire blob split into its body and both signature slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireParts<'a> {
    pub body: &'a [u8],
    pub sig1: Signature,
    pub sig2: Signature,
}

/// Split `body || sig1 || sig2` positionally.
pub fn split_wire(wire: &[u8]) -> Result<WireParts<'_>> {
    if wire.len() < WIRE_SIGNATURES_LENGTH {
        return Err(LedgerError::WireTooShort(wire.len()));
    }
    let sig_start = wire.len() - WIRE_SIGNATURES_LENGTH;
    let (body, sigs) = wire.split_at(sig_start);
    Ok(WireParts {
        body,
        sig1: Signature::from_slice(&sigs[..SIGNATURE_LENGTH])?,
        sig2: Signature::from_slice(&sigs[SIGNATURE_LENGTH..])?,
    })
}

/// Open `data` as an RLP list of exactly `expected` items that spans all of `data`.
pub fn open_list(data: &[u8], expected: usize) -> Result<Rlp<'_>> {
    let rlp = Rlp::new(data);
    if !rlp.is_list() {
        return Err(LedgerError::Rlp("transaction body must be an RLP list".into()));
    }

    let info = rlp.payload_info()?;
    if info.header_len + info.value_len != data.len() {
        return Err(LedgerError::Rlp(format!(
            "trailing bytes after RLP list: {} of {} consumed",
            info.header_len + info.value_len,
            data.len()
        )));
    }

    let item_count = rlp.item_count()?;
    if item_count != expected {
        return Err(LedgerError::Rlp(format!(
            "expected {} fields, got {}",
            expected, item_count
        )));
    }
    Ok(rlp)
}

pub fn decode_scalar<T: Decodable>(rlp: &Rlp, index: usize) -> Result<T> {
    rlp.at(index)
        .and_then(|r| r.as_val())
        .map_err(|e| field_error(index, e))
}

pub fn decode_bytes(rlp: &Rlp, index: usize) -> Result<Vec<u8>> {
    rlp.at(index)
        .and_then(|r| r.as_val::<Vec<u8>>())
        .map_err(|e| field_error(index, e))
}

pub fn decode_u256(rlp: &Rlp, index: usize) -> Result<U256> {
    let bytes = decode_bytes(rlp, index)?;
    if bytes.len() > 32 {
        return Err(LedgerError::InvalidField {
            index,
            reason: format!("U256 too large: {} bytes", bytes.len()),
        });
    }
    if bytes.first() == Some(&0) {
        return Err(LedgerError::InvalidField {
            index,
            reason: "non-canonical integer (leading zero)".into(),
        });
    }
    Ok(U256::from_big_endian(&bytes))
}

/// Empty bytes decode as `None`; otherwise exactly 20 bytes are required.
pub fn decode_optional_address(rlp: &Rlp, index: usize) -> Result<Option<Address>> {
    let bytes = decode_bytes(rlp, index)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    let address: Address = bytes
        .as_slice()
        .try_into()
        .map_err(|_| LedgerError::InvalidField {
            index,
            reason: format!("invalid address length: {} bytes", bytes.len()),
        })?;
    Ok(Some(address))
}

fn field_error(index: usize, e: rlp::DecoderError) -> LedgerError {
    LedgerError::InvalidField {
        index,
        reason: format!("{:?}", e),
    }
}
