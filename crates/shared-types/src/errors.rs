//! # Error Types
//!
//! Parsing and conversion errors for the shared primitives.

use thiserror::Error;

/// Errors raised while parsing or converting shared primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Input was not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded bytes have the wrong width.
    #[error("Invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Unknown transaction type tag.
    #[error("Unknown transaction type: {0}")]
    UnknownTxType(u8),

    /// Encoded UTXO position does not fit the component widths.
    #[error("UTXO position out of range: {0}")]
    PositionOutOfRange(u128),

    /// Decimal amount could not be parsed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
