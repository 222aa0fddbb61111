//! # Integration Tests
//!
//! Scenarios that drive the chain, storage and anchor crates together.

pub mod common;
pub mod failures;
pub mod replay;
pub mod scenarios;
pub mod submitter;
