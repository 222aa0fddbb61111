//! Pure chain logic: the UTXO set and the per-type transition rules.

pub mod rules;
pub mod utxo_set;
