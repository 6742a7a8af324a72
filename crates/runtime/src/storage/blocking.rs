//! Adapter that runs a blocking provider through the suspending interface.

use async_trait::async_trait;

use super::{AsyncStorageProvider, Result, StorageProvider};

/// Exposes a [`StorageProvider`] as an [`AsyncStorageProvider`].
///
/// Every call completes on first poll, so the saver and loader drive their
/// single pipeline with `futures::executor::block_on` for the blocking entry
/// points without touching an async runtime.
pub struct Blocking<'a, P: ?Sized>(pub &'a P);

#[async_trait]
impl<'a, P: StorageProvider + ?Sized> AsyncStorageProvider for Blocking<'a, P> {
    async fn exists(&self, name: &str) -> bool {
        self.0.exists(name)
    }

    async fn load(&self, name: &str) -> Result<Vec<u8>> {
        self.0.load(name)
    }

    async fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.0.save(name, bytes)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.0.delete(name)
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<()> {
        self.0.copy(src, dst)
    }
}
