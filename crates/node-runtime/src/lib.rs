//! # Node Runtime Library
//!
//! Exposes the runtime's modules for testing. The entry point is the
//! `main.rs` binary.
//!
//! - `container/` - configuration and component wiring
//! - `handlers/` - background loops

pub mod container;
pub mod handlers;

pub use container::{ConfigError, NodeConfig, StorageBackend, SubsystemContainer};
pub use handlers::AssemblyHandler;
