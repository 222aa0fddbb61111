//! # Block Assembly Handler
//!
//! Calls [`UtxoPlasmaChain::generate_next_block`] on a fixed cadence.
//! Failures are logged and the next tick tries again.

use std::sync::Arc;
use std::time::Duration;

use pc_05_chain_state::UtxoPlasmaChain;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Periodic block producer.
pub struct AssemblyHandler {
    chain: Arc<UtxoPlasmaChain>,
    interval: Duration,
}

impl AssemblyHandler {
    pub fn new(chain: Arc<UtxoPlasmaChain>, interval: Duration) -> Self {
        Self { chain, interval }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("[pc-05] Block assembly started (every {:?})", self.interval);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            match self.chain.generate_next_block().await {
                Ok(Some(block)) => debug!("[pc-05] Assembled block {}", block.number()),
                Ok(None) => {}
                Err(e) if e.is_transient() => warn!("[pc-05] Block assembly deferred: {}", e),
                Err(e) => error!("[pc-05] Block assembly failed: {}", e),
            }
        }

        info!("[pc-05] Shutdown signal received, block assembly stopped");
    }
}
