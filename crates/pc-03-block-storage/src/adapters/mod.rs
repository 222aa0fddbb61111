//! Storage adapters.

pub mod file;
pub mod lock;
