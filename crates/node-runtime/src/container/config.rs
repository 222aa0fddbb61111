//! # Node Configuration
//!
//! Configuration for every component the operator runs.
//!
//! ## Sources
//!
//! 1. Built-in defaults
//! 2. Optional JSON file named by `PC_CONFIG`
//! 3. Environment overrides (`PC_BLOCK_INTERVAL`, `PC_ASSEMBLY_INTERVAL_MS`,
//!    `PC_STORAGE_BACKEND`, `PC_DATA_DIR`, `PC_OPERATOR_KEY`,
//!    `PC_SUBMIT_POLL_MS`)
//!
//! ## Security Requirements
//!
//! - The operator key MUST be set; there is no default
//! - The well-known development key is accepted with a warning

use pc_04_root_anchor::{SubmitterConfig, DEFAULT_BLOCK_INTERVAL};
use pc_05_chain_state::ChainConfig;
use serde::Deserialize;
use shared_crypto::Secp256k1KeyPair;
use shared_types::hex_util;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Environment variable naming the JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "PC_CONFIG";

/// First account of the common local development mnemonic.
pub const DEVELOPMENT_OPERATOR_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Complete node configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub chain: ChainSection,
    pub storage: StorageConfig,
    pub operator: OperatorConfig,
    pub submitter: SubmitterSection,
}

/// Block numbering and assembly cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainSection {
    pub block_interval: u64,
    /// Delay between two block assembly attempts.
    pub assembly_interval_ms: u64,
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            block_interval: DEFAULT_BLOCK_INTERVAL,
            assembly_interval_ms: 1_000,
        }
    }
}

/// Which [`pc_03_block_storage::BlockStore`] backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            _ => Err(ConfigError::InvalidEnv {
                var: "PC_STORAGE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the file backend.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Operator identity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    /// Hex secp256k1 secret key. MUST be provided.
    pub private_key: Option<String>,
}

/// Header submission loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubmitterSection {
    pub poll_interval_ms: u64,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for SubmitterSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            base_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

impl NodeConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Defaults, then the `PC_CONFIG` file if set, then process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `PC_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PC_BLOCK_INTERVAL") {
            self.chain.block_interval = parse_number("PC_BLOCK_INTERVAL", &value)?;
        }
        if let Some(value) = lookup("PC_ASSEMBLY_INTERVAL_MS") {
            self.chain.assembly_interval_ms = parse_number("PC_ASSEMBLY_INTERVAL_MS", &value)?;
        }
        if let Some(value) = lookup("PC_STORAGE_BACKEND") {
            self.storage.backend = value.parse()?;
        }
        if let Some(value) = lookup("PC_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("PC_OPERATOR_KEY") {
            self.operator.private_key = Some(value);
        }
        if let Some(value) = lookup("PC_SUBMIT_POLL_MS") {
            self.submitter.poll_interval_ms = parse_number("PC_SUBMIT_POLL_MS", &value)?;
        }
        Ok(())
    }

    /// Check the configuration can start a node.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the block interval is zero
    /// - the operator key is missing or not a valid secp256k1 secret
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.block_interval == 0 {
            return Err(ConfigError::ZeroBlockInterval);
        }
        self.operator_key()?;
        if self.uses_development_key() {
            warn!("Operator is using the public development key. Do not use it outside local testing.");
        }
        Ok(())
    }

    /// Parse the operator key.
    pub fn operator_key(&self) -> Result<Secp256k1KeyPair, ConfigError> {
        let hex = self
            .operator
            .private_key
            .as_deref()
            .ok_or(ConfigError::MissingOperatorKey)?;
        Secp256k1KeyPair::from_hex(hex).map_err(|_| ConfigError::InvalidOperatorKey)
    }

    pub fn uses_development_key(&self) -> bool {
        self.operator
            .private_key
            .as_deref()
            .map(|key| {
                hex_util::strip_prefix(key.trim())
                    .eq_ignore_ascii_case(hex_util::strip_prefix(DEVELOPMENT_OPERATOR_KEY))
            })
            .unwrap_or(false)
    }

    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            block_interval: self.chain.block_interval,
        }
    }

    pub fn submitter_config(&self) -> SubmitterConfig {
        SubmitterConfig {
            block_interval: self.chain.block_interval,
            poll_interval: Duration::from_millis(self.submitter.poll_interval_ms),
            base_backoff: Duration::from_millis(self.submitter.base_backoff_ms),
            max_backoff: Duration::from_millis(self.submitter.max_backoff_ms),
        }
    }

    pub fn assembly_interval(&self) -> Duration {
        Duration::from_millis(self.chain.assembly_interval_ms)
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    Io { path: PathBuf, message: String },
    /// Configuration file is not valid JSON for [`NodeConfig`].
    Parse(String),
    /// An environment override could not be parsed.
    InvalidEnv { var: &'static str, value: String },
    ZeroBlockInterval,
    MissingOperatorKey,
    InvalidOperatorKey,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "Cannot read config file {}: {}", path.display(), message)
            }
            ConfigError::Parse(message) => write!(f, "Invalid config file: {}", message),
            ConfigError::InvalidEnv { var, value } => {
                write!(f, "Invalid value for {}: {:?}", var, value)
            }
            ConfigError::ZeroBlockInterval => write!(f, "block_interval must be non-zero"),
            ConfigError::MissingOperatorKey => write!(
                f,
                "Operator key is not set. Set PC_OPERATOR_KEY or operator.private_key in the config file."
            ),
            ConfigError::InvalidOperatorKey => {
                write!(f, "Operator key is not a valid secp256k1 secret key")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
