//! # Shared Types Crate
//!
//! This crate contains the primitive types every Plasma-Chain crate agrees on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: hashes, addresses, signatures and UTXO
//!   positions are defined once here.
//! - **Raw Bytes Internally**: addresses and hashes are fixed-size byte arrays.
//!   Hex appears only at the edges (records, logs, configuration), so case
//!   normalization is implicit.
//! - **Explicit Absence**: the zero address and the zero signature exist only
//!   as wire sentinels; domain code uses `Option`.

pub mod entities;
pub mod errors;
pub mod hex_util;
pub mod units;

pub use entities::*;
pub use errors::*;
