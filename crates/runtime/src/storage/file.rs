//! File-based storage provider.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{AsyncStorageProvider, Result, StorageError, StorageProvider};

/// Stores each blob as one file under a base directory.
///
/// # File Format
///
/// The blob under `name` is written verbatim to `{base_dir}/{name}`. Writes go
/// to `{name}.tmp` first and are renamed into place, so a crash mid-write
/// never leaves a truncated file under the real name.
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_dir`, creating it if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a storage name to its file path.
    ///
    /// Names must be a single path component.
    fn path(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.ends_with(".tmp");
        if !valid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.base_dir.join(name))
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

fn not_found(name: &str, err: std::io::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(name.to_string())
    } else {
        StorageError::Io(err)
    }
}

impl StorageProvider for FileStorage {
    fn exists(&self, name: &str) -> bool {
        self.path(name).map(|path| path.is_file()).unwrap_or(false)
    }

    fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path(name)?;
        let bytes = fs::read(&path).map_err(|e| not_found(name, e))?;

        tracing::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());

        Ok(bytes)
    }

    fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(name)?;
        let temp_path = Self::temp_path(&path);

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved {} ({} bytes)", path.display(), bytes.len());

        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.path(name)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let bytes = StorageProvider::load(self, src)?;
        StorageProvider::save(self, dst, &bytes)
    }
}

#[async_trait]
impl AsyncStorageProvider for FileStorage {
    async fn exists(&self, name: &str) -> bool {
        match self.path(name) {
            Ok(path) => tokio::fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path(name)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| not_found(name, e))?;

        tracing::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());

        Ok(bytes)
    }

    async fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(name)?;
        let temp_path = Self::temp_path(&path);

        tokio::fs::write(&temp_path, bytes).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        tracing::debug!("Saved {} ({} bytes)", path.display(), bytes.len());

        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.path(name)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let bytes = AsyncStorageProvider::load(self, src).await?;
        AsyncStorageProvider::save(self, dst, &bytes).await
    }
}
