//! # Runtime Handlers
//!
//! Long-running loops spawned by the runtime. Each one observes the shared
//! `watch` shutdown channel.

pub mod assembly;

pub use assembly::AssemblyHandler;
