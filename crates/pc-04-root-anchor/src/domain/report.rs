//! Outcome of one submitter tick.

use super::errors::AnchorError;

/// A header the root ledger refused this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFailure {
    pub block_number: u64,
    pub error: AnchorError,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Root ledger head at the start of the tick.
    pub anchor_block: u64,
    /// Headers accepted, ascending.
    pub submitted: Vec<u64>,
    pub failed: Vec<SubmissionFailure>,
}

impl SubmissionReport {
    pub fn new(anchor_block: u64) -> Self {
        Self {
            anchor_block,
            ..Self::default()
        }
    }

    /// True when nothing was attempted.
    pub fn is_idle(&self) -> bool {
        self.submitted.is_empty() && self.failed.is_empty()
    }

    /// True when any failure may clear on retry.
    pub fn has_transient_failure(&self) -> bool {
        self.failed.iter().any(|f| f.error.is_transient())
    }
}
