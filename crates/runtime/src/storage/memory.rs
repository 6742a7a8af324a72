//! In-memory storage provider for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{AsyncStorageProvider, Result, StorageError, StorageProvider};

/// In-memory implementation of both storage forms.
///
/// Blobs live in a map guarded by a lock; nothing outlives the process.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let blobs = self.blobs.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut names: Vec<String> = blobs.keys().cloned().collect();
        names.sort_unstable();
        Ok(names)
    }
}

impl StorageProvider for MemoryStorage {
    fn exists(&self, name: &str) -> bool {
        self.blobs
            .read()
            .map(|blobs| blobs.contains_key(name))
            .unwrap_or(false)
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        let blobs = self.blobs.read().map_err(|_| StorageError::LockPoisoned)?;
        blobs
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut blobs = self.blobs.write().map_err(|_| StorageError::LockPoisoned)?;
        blobs.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut blobs = self.blobs.write().map_err(|_| StorageError::LockPoisoned)?;
        blobs.remove(name);
        Ok(())
    }

    fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let mut blobs = self.blobs.write().map_err(|_| StorageError::LockPoisoned)?;
        let bytes = blobs
            .get(src)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(src.to_string()))?;
        blobs.insert(dst.to_string(), bytes);
        Ok(())
    }
}

#[async_trait]
impl AsyncStorageProvider for MemoryStorage {
    async fn exists(&self, name: &str) -> bool {
        StorageProvider::exists(self, name)
    }

    async fn load(&self, name: &str) -> Result<Vec<u8>> {
        StorageProvider::load(self, name)
    }

    async fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        StorageProvider::save(self, name, bytes)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        StorageProvider::delete(self, name)
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<()> {
        StorageProvider::copy(self, src, dst)
    }
}
