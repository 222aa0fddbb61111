//! # Ports
//!
//! - `inbound`: the `BlockStore` API the chain state machine drives.
//! - `outbound`: the `KeyValueStore` the block store is built on.

pub mod inbound;
pub mod outbound;
