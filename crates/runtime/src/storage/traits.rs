//! Storage provider contracts.

use async_trait::async_trait;

use super::Result;

/// Blocking key/blob storage.
///
/// `load` and `copy` fail with [`StorageError::NotFound`](super::StorageError::NotFound)
/// when the source is absent; they never hand back an empty blob in its
/// place. `delete` of an absent name succeeds.
pub trait StorageProvider: Send + Sync {
    /// Check whether a blob exists under `name`.
    fn exists(&self, name: &str) -> bool;

    /// Read the blob stored under `name`.
    fn load(&self, name: &str) -> Result<Vec<u8>>;

    /// Write `bytes` under `name`, replacing any previous blob.
    fn save(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Remove the blob under `name`, if any.
    fn delete(&self, name: &str) -> Result<()>;

    /// Duplicate the blob under `src` to `dst`.
    fn copy(&self, src: &str, dst: &str) -> Result<()>;
}

/// Suspending counterpart of [`StorageProvider`].
///
/// Implementations suspend only on I/O; the guarantees are identical to the
/// blocking form.
#[async_trait]
pub trait AsyncStorageProvider: Send + Sync {
    async fn exists(&self, name: &str) -> bool;

    async fn load(&self, name: &str) -> Result<Vec<u8>>;

    async fn save(&self, name: &str, bytes: &[u8]) -> Result<()>;

    async fn delete(&self, name: &str) -> Result<()>;

    async fn copy(&self, src: &str, dst: &str) -> Result<()>;
}
