//! # Subsystem Container
//!
//! Holds the configured storage, root anchor, chain and submitter with the
//! lifetimes the runtime needs.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig, StorageBackend};
pub use subsystems::SubsystemContainer;
