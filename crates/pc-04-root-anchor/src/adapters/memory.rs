//! In-memory root ledger.
//!
//! Mirrors the root contract's bookkeeping closely enough to drive the
//! operator end to end without a real chain:
//!
//! - the child block counter starts at one interval and advances by one
//!   interval per accepted header
//! - deposits between two headers are numbered `current - interval + n`,
//!   `n` counting from 1 and reset by every accepted header
//! - a header for any other number than the current child block is refused
//!   as out of sync
//!
//! Tests can also inject transient outages.

use crate::domain::errors::AnchorError;
use crate::domain::events::{DepositEvent, ExitStartedEvent};
use crate::ports::RootAnchor;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{hex_util, Address, Hash, UtxoPosition, U256};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
struct RecordedExit {
    event: ExitStartedEvent,
    /// Child block counter when the exit was started.
    started_at: u64,
}

#[derive(Debug)]
struct AnchorState {
    interval: u64,
    current_child_block: u64,
    next_deposit_offset: u64,
    deposits: BTreeMap<u64, DepositEvent>,
    exits: Vec<RecordedExit>,
    headers: BTreeMap<u64, Hash>,
    pending_failures: u32,
}

impl AnchorState {
    /// Consume one injected failure, if any.
    fn check_available(&mut self) -> Result<(), AnchorError> {
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(AnchorError::Unavailable("injected outage".to_string()));
        }
        Ok(())
    }
}

/// Development and test root ledger.
#[derive(Debug)]
pub struct InMemoryRootAnchor {
    state: RwLock<AnchorState>,
}

impl InMemoryRootAnchor {
    pub fn new(interval: u64) -> Self {
        Self {
            state: RwLock::new(AnchorState {
                interval,
                current_child_block: interval,
                next_deposit_offset: 1,
                deposits: BTreeMap::new(),
                exits: Vec::new(),
                headers: BTreeMap::new(),
                pending_failures: 0,
            }),
        }
    }

    /// Lock a deposit and number it the way the root contract does.
    pub fn deposit(&self, depositor: Address, amount: U256, token: Address) -> u64 {
        let mut state = self.state.write();
        let deposit_block = state.current_child_block - state.interval + state.next_deposit_offset;
        state.next_deposit_offset += 1;
        state.deposits.insert(
            deposit_block,
            DepositEvent {
                deposit_block,
                depositor,
                amount,
                token,
            },
        );
        info!(
            "[pc-04] 💰 Deposit of {} to {} at block {}",
            amount,
            hex_util::to_hex(&depositor),
            deposit_block
        );
        deposit_block
    }

    /// Record a deposit at an explicit block number. Replaces any deposit there.
    pub fn deposit_at(&self, deposit_block: u64, depositor: Address, amount: U256, token: Address) {
        self.state.write().deposits.insert(
            deposit_block,
            DepositEvent {
                deposit_block,
                depositor,
                amount,
                token,
            },
        );
    }

    /// Start an exit against `utxo_pos`.
    pub fn start_exit(&self, utxo_pos: UtxoPosition, token: Address) {
        let mut state = self.state.write();
        let started_at = state.current_child_block;
        state.exits.push(RecordedExit {
            event: ExitStartedEvent { utxo_pos, token },
            started_at,
        });
        info!("[pc-04] 🚪 Exit started for {} at {}", utxo_pos, started_at);
    }

    /// Make the next `count` calls fail with `AnchorError::Unavailable`.
    pub fn fail_next(&self, count: u32) {
        self.state.write().pending_failures = count;
    }

    /// Root accepted for `block_number`, if any.
    pub fn submitted_root(&self, block_number: u64) -> Option<Hash> {
        self.state.read().headers.get(&block_number).copied()
    }

    /// Every accepted header, ascending.
    pub fn submitted_headers(&self) -> Vec<(u64, Hash)> {
        self.state
            .read()
            .headers
            .iter()
            .map(|(number, root)| (*number, *root))
            .collect()
    }
}

#[async_trait]
impl RootAnchor for InMemoryRootAnchor {
    async fn deposit_events(&self, since_block: u64) -> Result<Vec<DepositEvent>, AnchorError> {
        let mut state = self.state.write();
        state.check_available()?;
        let events: Vec<DepositEvent> = state
            .deposits
            .range(since_block..)
            .map(|(_, event)| *event)
            .collect();
        if !events.is_empty() {
            debug!("[pc-04] Returning {} deposits since {}", events.len(), since_block);
        }
        Ok(events)
    }

    async fn exit_started_events(
        &self,
        since_block: u64,
    ) -> Result<Vec<ExitStartedEvent>, AnchorError> {
        let mut state = self.state.write();
        state.check_available()?;
        Ok(state
            .exits
            .iter()
            .filter(|exit| exit.started_at >= since_block)
            .map(|exit| exit.event)
            .collect())
    }

    async fn current_child_block(&self) -> Result<u64, AnchorError> {
        let mut state = self.state.write();
        state.check_available()?;
        Ok(state.current_child_block)
    }

    async fn submit_block_header(&self, block_number: u64, root: Hash) -> Result<(), AnchorError> {
        let mut state = self.state.write();
        state.check_available()?;
        if block_number != state.current_child_block {
            return Err(AnchorError::OutOfSync {
                anchor_block: state.current_child_block,
                child_block: block_number,
            });
        }
        state.headers.insert(block_number, root);
        state.current_child_block += state.interval;
        state.next_deposit_offset = 1;
        info!(
            "[pc-04] ⚓ Header {} anchored with root {}",
            block_number,
            hex_util::to_hex(&root)
        );
        Ok(())
    }
}
