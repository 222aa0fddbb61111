//! # Plasma-Chain Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion routines, driven from benches/
//! │   ├── merkle.rs
//! │   ├── ledger.rs
//! │   └── chain.rs
//! │
//! └── integration/      # Cross-crate scenarios
//!     ├── common.rs     # Fixtures: keys, chain harness, flaky store
//!     ├── scenarios.rs  # Deposit, merge, transfer, confirmation, capacity
//!     ├── replay.rs     # Restart and determinism
//!     ├── submitter.rs  # Header submission against the anchor
//!     └── failures.rs   # Storage and anchor outages
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pc-tests
//!
//! # By category
//! cargo test -p pc-tests integration::scenarios::
//! cargo test -p pc-tests integration::replay::
//!
//! # Benchmarks
//! cargo bench -p pc-tests
//! ```

pub mod integration;
