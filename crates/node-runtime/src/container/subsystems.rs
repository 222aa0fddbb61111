//! # Subsystem Container
//!
//! Builds every component in dependency order:
//!
//! ```text
//! storage (pc-03) ──┬──► chain state (pc-05) ──notify──┐
//! anchor  (pc-04) ──┤                                  ▼
//!                   └──────────────────────────► block submitter (pc-04)
//! ```
//!
//! ## Thread Safety
//!
//! - Every component is held in an `Arc` and shared with the spawned loops
//! - Components synchronize internally; the container adds no locks

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use pc_03_block_storage::{BlockStore, FileBackedKVStore, InMemoryKVStore, KvBlockStore};
use pc_04_root_anchor::{BlockSubmitter, InMemoryRootAnchor, RootAnchor};
use pc_05_chain_state::UtxoPlasmaChain;
use shared_types::hex_util;

use crate::container::config::{NodeConfig, StorageBackend};

/// Every component of a running operator.
pub struct SubsystemContainer {
    /// Block and UTXO storage.
    pub store: Arc<dyn BlockStore>,
    /// Development root ledger.
    pub anchor: Arc<InMemoryRootAnchor>,
    /// Chain state machine.
    pub chain: Arc<UtxoPlasmaChain>,
    /// Header submission loop, woken by the chain on every interval block.
    pub submitter: Arc<BlockSubmitter>,
    /// Node configuration (immutable after initialization).
    pub config: NodeConfig,
}

impl SubsystemContainer {
    /// Validate `config` and build every component.
    ///
    /// Storage is opened but not replayed; the runtime replays on start.
    #[instrument(name = "subsystem_init", skip(config))]
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.validate().context("Invalid node configuration")?;
        let operator = config.operator_key().context("Invalid operator key")?;
        info!(
            "Operator address {}",
            hex_util::to_hex(&operator.address())
        );

        let store: Arc<dyn BlockStore> = match config.storage.backend {
            StorageBackend::Memory => {
                info!("  [pc-03] In-memory block store");
                Arc::new(KvBlockStore::new(InMemoryKVStore::new()))
            }
            StorageBackend::File => {
                let kv = FileBackedKVStore::open(&config.storage.data_dir).with_context(|| {
                    format!("Failed to open data dir {}", config.storage.data_dir.display())
                })?;
                info!(
                    "  [pc-03] File block store at {}",
                    config.storage.data_dir.display()
                );
                Arc::new(KvBlockStore::new(kv))
            }
        };

        let anchor = Arc::new(InMemoryRootAnchor::new(config.chain.block_interval));
        info!("  [pc-04] In-memory root anchor (interval {})", config.chain.block_interval);
        let anchor_port: Arc<dyn RootAnchor> = anchor.clone();

        let submitter = Arc::new(BlockSubmitter::new(
            Arc::clone(&anchor_port),
            Arc::clone(&store),
            config.submitter_config(),
        ));

        let chain = UtxoPlasmaChain::new(
            config.chain_config(),
            operator,
            Arc::clone(&store),
            anchor_port,
        )
        .context("Failed to create chain state")?
        .with_block_notifier(submitter.notifier());
        info!("  [pc-05] Chain state ready");

        Ok(Self {
            store,
            anchor,
            chain: Arc::new(chain),
            submitter,
            config,
        })
    }
}
