//! # Root Anchor (pc-04)
//!
//! Everything that faces the root ledger.
//!
//! ## Responsibilities
//!
//! - **Events in**: deposits credited on the root ledger and exits started
//!   against child-chain outputs, each delivered to block assembly.
//! - **Headers out**: the merkle root of every interval-boundary block is
//!   submitted once the root ledger has advanced to that block number.
//! - **Signing**: personal-message signing and recovery, including the
//!   confirmation-signature helpers built on top of it.
//!
//! ## Failure Model
//!
//! | Error | Meaning | Caller behaviour |
//! |-------|---------|------------------|
//! | `AnchorError::Unavailable` | root ledger unreachable | log, retry next tick with backoff |
//! | `AnchorError::OutOfSync` | root ledger expects another block number | abandon this submission for the tick |
//! | `AnchorError::Crypto` | signing or recovery failed | surface to the caller |
//!
//! No anchor failure ever aborts block assembly.
//!
//! ## Crate Structure
//!
//! - `domain/` - events, errors, submission report, retry backoff
//! - `ports/` - the `RootAnchor` trait
//! - `adapters/` - `InMemoryRootAnchor`
//! - `submitter.rs` - `BlockSubmitter`, the header submission loop

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod submitter;

pub use adapters::memory::InMemoryRootAnchor;
pub use domain::backoff::RetryPolicy;
pub use domain::errors::{AnchorError, SubmitterError};
pub use domain::events::{DepositEvent, ExitStartedEvent};
pub use domain::report::{SubmissionFailure, SubmissionReport};
pub use ports::RootAnchor;
pub use submitter::{BlockSubmitter, SubmitterConfig};

/// Default number of child-chain blocks between two operator blocks.
pub const DEFAULT_BLOCK_INTERVAL: u64 = 100_000;
