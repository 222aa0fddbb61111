//! # Plasma-Chain Node Runtime
//!
//! The operator entry point.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, `PC_CONFIG` file, `PC_*` environment)
//! 2. Validate it: non-zero interval and a usable operator key
//! 3. Open storage and build the anchor, chain and submitter
//! 4. Replay persisted blocks into the UTXO set
//! 5. Spawn the block assembly and header submission loops
//! 6. Run until Ctrl+C, then signal shutdown and wait for the loops
//!
//! ## Loops
//!
//! ```text
//! AssemblyHandler ──generate_next_block──► UtxoPlasmaChain
//!                                              │ notify
//!                                              ▼
//!                                        BlockSubmitter ──submit_block_header──► RootAnchor
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use node_runtime::{AssemblyHandler, NodeConfig, SubsystemContainer};

/// How long shutdown waits for each loop to finish.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The running operator.
pub struct NodeRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self> {
        info!("Creating Plasma-Chain node runtime");
        let container = Arc::new(SubsystemContainer::new(config)?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        })
    }

    /// Replay the chain and spawn the background loops.
    pub async fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Plasma-Chain Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let summary = self
            .container
            .chain
            .replay()
            .await
            .context("Failed to replay persisted blocks")?;
        info!(
            "Chain head {} with {} live UTXOs",
            summary.head, summary.live_utxos
        );

        let submitter = Arc::clone(&self.container.submitter);
        self.tasks.push(submitter.spawn(self.shutdown_rx.clone()));

        let assembly = AssemblyHandler::new(
            Arc::clone(&self.container.chain),
            self.container.config.assembly_interval(),
        );
        self.tasks
            .push(tokio::spawn(assembly.run(self.shutdown_rx.clone())));

        info!("Block interval: {}", self.container.config.chain.block_interval);
        info!("Storage: {:?}", self.container.config.storage.backend);
        info!("Data Dir: {:?}", self.container.config.storage.data_dir);
        Ok(())
    }

    /// Signal every loop to stop and wait for them.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for task in self.tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Background task ended abnormally: {}", e),
                Err(_) => warn!("Background task did not stop within {:?}", SHUTDOWN_GRACE),
            }
        }
        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = NodeConfig::load().context("Failed to load configuration")?;

    let mut runtime = NodeRuntime::new(config)?;
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
