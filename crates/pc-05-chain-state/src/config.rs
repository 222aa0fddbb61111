//! Chain state configuration.

/// Tuning for [`crate::UtxoPlasmaChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Child blocks between two operator blocks. Deposit blocks fill the gap.
    pub block_interval: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            block_interval: pc_04_root_anchor::DEFAULT_BLOCK_INTERVAL,
        }
    }
}
