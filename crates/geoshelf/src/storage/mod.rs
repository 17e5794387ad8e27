//! Key-value persistence side-channel for catalog snapshots.
//!
//! The mechanism is deliberately opaque: a backend maps a store key to a
//! full list of nodes. `save` is an idempotent full overwrite; `load` of a
//! never-written key returns the built-in seed catalog.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::catalog::node::ResourceNode;
use crate::catalog::seed;
use crate::error::StorageError;

/// Default catalog store key.
pub const CATALOG_KEY: &str = "catalog";

/// Store key for the distinct "output" catalog.
pub const OUTPUT_CATALOG_KEY: &str = "output-catalog";

pub trait CatalogBackend: Send + Sync {
    fn load(&self, key: &str) -> Result<Vec<ResourceNode>, StorageError>;
    fn save(&self, key: &str, nodes: &[ResourceNode]) -> Result<(), StorageError>;
}

/// In-memory backend.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Vec<ResourceNode>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose default catalog key starts out empty instead of
    /// seeded. Test fixtures build their own trees on top of this.
    pub fn empty() -> Self {
        let backend = Self::new();
        if let Ok(mut entries) = backend.entries.write() {
            entries.insert(CATALOG_KEY.to_string(), vec![]);
        }
        backend
    }
}

impl CatalogBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Vec<ResourceNode>, StorageError> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Memory backend lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        Ok(entries
            .get(key)
            .cloned()
            .unwrap_or_else(seed::seed_catalog))
    }

    fn save(&self, key: &str, nodes: &[ResourceNode]) -> Result<(), StorageError> {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Memory backend lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        entries.insert(key.to_string(), nodes.to_vec());
        Ok(())
    }
}

/// File-backed backend: one JSON snapshot per store key.
pub struct JsonFileBackend {
    base_directory: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self, StorageError> {
        let base_directory = base_directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_directory).map_err(|e| StorageError::CreateDirectory {
            path: base_directory.clone(),
            source: e,
        })?;
        Ok(Self { base_directory })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_directory.join(format!("{}.json", key))
    }
}

impl CatalogBackend for JsonFileBackend {
    fn load(&self, key: &str) -> Result<Vec<ResourceNode>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(seed::seed_catalog());
        }

        let raw = std::fs::read_to_string(&path)
            .map_err(|e| StorageError::ReadFile { path, source: e })?;
        serde_json::from_str(&raw).map_err(|e| StorageError::DecodeSnapshot {
            key: key.to_string(),
            source: e,
        })
    }

    fn save(&self, key: &str, nodes: &[ResourceNode]) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string_pretty(nodes).map_err(|e| StorageError::EncodeSnapshot {
                key: key.to_string(),
                source: e,
            })?;
        let path = self.path_for(key);
        std::fs::write(&path, raw).map_err(|e| StorageError::WriteFile { path, source: e })
    }
}
