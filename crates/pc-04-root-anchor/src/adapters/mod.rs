//! Adapters layer.

pub mod memory;
