//! Exponential backoff for the submitter loop.
//!
//! Counts consecutive failed ticks. The delay doubles from `base` with every
//! failure, is capped at `max`, and drops back to the poll interval on the
//! first success.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    base: Duration,
    max: Duration,
    consecutive_failures: u32,
    total_failures: u64,
}

impl RetryPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            consecutive_failures: 0,
            total_failures: 0,
        }
    }

    /// Record a failed tick and return the delay before the next attempt.
    pub fn record_failure(&mut self) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.total_failures += 1;
        self.current_delay().unwrap_or(self.base)
    }

    pub fn record_success(&mut self) {
        if self.consecutive_failures > 0 {
            tracing::info!(
                "[pc-04] Submitter recovered after {} failed ticks",
                self.consecutive_failures
            );
        }
        self.consecutive_failures = 0;
    }

    /// Backoff delay, or `None` when the last tick succeeded.
    pub fn current_delay(&self) -> Option<Duration> {
        if self.consecutive_failures == 0 {
            return None;
        }
        // 2^31 already overflows any sane base; clamp the exponent first
        let exponent = (self.consecutive_failures - 1).min(31);
        let delay = self
            .base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max);
        Some(delay.min(self.max))
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }
}
