//! # Block Submitter
//!
//! Anchors produced headers on the root ledger.
//!
//! Each tick reads the root ledger's current child block `c`, loads the local
//! interval-boundary blocks numbered `>= c` and submits them in ascending
//! order, one at a time. Deposit blocks are never submitted: the root ledger
//! numbered them itself. A refused header is logged and retried next tick.
//!
//! The loop wakes on a fixed poll interval or when block assembly notifies
//! it, backs off exponentially while ticks keep failing, and stops when the
//! shutdown channel flips.

use crate::domain::backoff::RetryPolicy;
use crate::domain::errors::SubmitterError;
use crate::domain::report::{SubmissionFailure, SubmissionReport};
use crate::ports::RootAnchor;
use pc_03_block_storage::BlockStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Submitter tuning.
#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    /// Child blocks between two operator blocks.
    pub block_interval: u64,
    pub poll_interval: Duration,
    /// First backoff delay after a failed tick.
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            block_interval: crate::DEFAULT_BLOCK_INTERVAL,
            poll_interval: Duration::from_secs(1),
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

/// Clears the in-flight flag when a tick ends, including by early return.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-flight header submitter.
pub struct BlockSubmitter {
    anchor: Arc<dyn RootAnchor>,
    store: Arc<dyn BlockStore>,
    config: SubmitterConfig,
    in_flight: AtomicBool,
    wake: Arc<Notify>,
}

impl BlockSubmitter {
    pub fn new(
        anchor: Arc<dyn RootAnchor>,
        store: Arc<dyn BlockStore>,
        config: SubmitterConfig,
    ) -> Self {
        Self {
            anchor,
            store,
            config,
            in_flight: AtomicBool::new(false),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Handle block assembly uses to wake the loop early.
    pub fn notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    /// Run one submission pass.
    ///
    /// # Errors
    ///
    /// `SubmitterError::AlreadyRunning` if a pass is in flight. Anchor or
    /// storage failures that prevent the pass from starting. Failures of
    /// individual headers are reported in the [`SubmissionReport`] instead.
    pub async fn tick(&self) -> Result<SubmissionReport, SubmitterError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitterError::AlreadyRunning);
        }
        let _guard = FlightGuard(&self.in_flight);

        let current = self.anchor.current_child_block().await?;
        let interval = self.config.block_interval;
        let candidates = self.store.blocks_in_range(Some(current), None).await?;

        let mut report = SubmissionReport::new(current);
        for block in candidates {
            let number = block.number();
            if interval == 0 || number % interval != 0 {
                continue;
            }
            let Some(root) = block.merkle_root() else {
                continue;
            };
            match self.anchor.submit_block_header(number, root).await {
                Ok(()) => {
                    info!("[pc-04] ⚓ Submitted header {}", number);
                    report.submitted.push(number);
                }
                Err(e) => {
                    warn!("[pc-04] Header {} not submitted: {}", number, e);
                    report.failed.push(SubmissionFailure {
                        block_number: number,
                        error: e,
                    });
                }
            }
        }

        if !report.is_idle() {
            debug!(
                "[pc-04] Tick at anchor block {}: {} submitted, {} failed",
                current,
                report.submitted.len(),
                report.failed.len()
            );
        }
        Ok(report)
    }

    /// Start the loop on the current runtime.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut policy =
                RetryPolicy::new(self.config.base_backoff, self.config.max_backoff);
            info!(
                "[pc-04] Block submitter started (poll every {:?})",
                self.config.poll_interval
            );

            loop {
                let delay = policy.current_delay().unwrap_or(self.config.poll_interval);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.wake.notified() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                match self.tick().await {
                    Ok(report) if report.has_transient_failure() => {
                        let next = policy.record_failure();
                        warn!("[pc-04] Root ledger unavailable, retrying in {:?}", next);
                    }
                    Ok(_) => policy.record_success(),
                    Err(SubmitterError::AlreadyRunning) => {}
                    Err(e) => {
                        let next = policy.record_failure();
                        error!("[pc-04] Submission tick failed: {} (retry in {:?})", e, next);
                    }
                }
            }

            info!("[pc-04] Block submitter stopped");
        })
    }
}
