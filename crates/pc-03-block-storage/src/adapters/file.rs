//! File-backed key-value store.
//!
//! The whole map lives in memory and every write rewrites `chain.db`
//! through a temp file and a rename, so a crash leaves either the old
//! or the new image on disk.
//!
//! Record format: `[key_len: u32 LE][key][value_len: u32 LE][value]`, repeated.

use crate::adapters::lock::{DatabaseLock, LockError};
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{apply_batch, scan_map, BatchOperation, KeyValueStore, ScanResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the data file inside the data directory.
pub const DATA_FILE: &str = "chain.db";

pub struct FileBackedKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
    _lock: DatabaseLock,
}

impl FileBackedKVStore {
    /// Open (or create) the store in `data_dir`, taking the directory lock.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, KVStoreError> {
        let data_dir = data_dir.as_ref();
        let lock = DatabaseLock::acquire(data_dir).map_err(|e| match e {
            LockError::AlreadyLocked { .. } => KVStoreError::Locked {
                message: e.to_string(),
            },
            other => KVStoreError::IOError {
                message: other.to_string(),
            },
        })?;

        let path = data_dir.join(DATA_FILE);
        let data = match std::fs::read(&path) {
            Ok(bytes) => {
                let data = Self::decode(&bytes)?;
                info!(
                    "[pc-03] 💾 Loaded {} keys from {} ({} bytes)",
                    data.len(),
                    path.display(),
                    bytes.len()
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("[pc-03] 📁 No existing chain data at {}", path.display());
                HashMap::new()
            }
            Err(e) => {
                return Err(KVStoreError::IOError {
                    message: e.to_string(),
                })
            }
        };

        Ok(Self {
            data,
            path,
            _lock: lock,
        })
    }

    /// Path of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(bytes: &[u8]) -> Result<HashMap<Vec<u8>, Vec<u8>>, KVStoreError> {
        let mut data = HashMap::new();
        let mut cursor = 0;
        while cursor < bytes.len() {
            let key = Self::read_chunk(bytes, &mut cursor)?;
            let value = Self::read_chunk(bytes, &mut cursor)?;
            data.insert(key, value);
        }
        Ok(data)
    }

    fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
        let truncated = |at: usize| KVStoreError::CorruptionError {
            message: format!("data file truncated at byte {}", at),
        };
        let len_end = cursor.checked_add(4).ok_or_else(|| truncated(*cursor))?;
        let len_bytes: [u8; 4] = bytes
            .get(*cursor..len_end)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| truncated(*cursor))?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let end = len_end.checked_add(len).ok_or_else(|| truncated(len_end))?;
        let chunk = bytes.get(len_end..end).ok_or_else(|| truncated(len_end))?;
        *cursor = end;
        Ok(chunk.to_vec())
    }

    fn encode(data: &HashMap<Vec<u8>, Vec<u8>>) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (key, value) in data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }
        bytes
    }

    fn save(&self, data: &HashMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        use std::io::Write;

        let io = |e: std::io::Error| KVStoreError::IOError {
            message: e.to_string(),
        };
        let bytes = Self::encode(data);
        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io)?;
        file.write_all(&bytes).map_err(io)?;
        file.sync_all().map_err(io)?;
        std::fs::rename(&temp_path, &self.path).map_err(io)?;
        debug!("[pc-03] Wrote {} keys ({} bytes)", data.len(), bytes.len());
        Ok(())
    }

    /// Persist a modified copy, then swap it in. Memory never runs ahead of disk.
    fn commit(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut next = self.data.clone();
        apply_batch(&mut next, operations);
        self.save(&next)?;
        self.data = next;
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.commit(vec![BatchOperation::put(key, value)])
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.commit(vec![BatchOperation::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.commit(operations)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan_map(&self.data, prefix))
    }
}
