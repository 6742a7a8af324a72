//! Transactional write pipeline.
//!
//! # Save Protocol
//!
//! For the file `name` bound to a kind:
//! 1. If `name` exists, drop any stale `name{suffix}` and copy `name` onto it
//! 2. Snapshot the live model through its save strategy and stamp its version
//! 3. Encode the snapshot and write it to `name`
//! 4. Delete `name{suffix}` (commit)
//!
//! If step 2 or 3 fails, `name` is deleted and restored from the backup when
//! one exists, then the backup is removed. After [`GameSaver::save`] returns,
//! `name` holds either the new snapshot or exactly its previous bytes.
//!
//! The blocking and suspending entry points share one pipeline; the blocking
//! form drives it over [`Blocking`] storage.

use std::sync::Arc;

use futures::executor::block_on;
use tracing::{debug, error, info, warn};

use save_core::{GameData, ModelKind, SaveStrategy};

use crate::api::{BatchReport, PersistenceError, Result, SaveOutcome};
use crate::bindings::{BindingTable, SaveBinding, SaveEntry};
use crate::codec::Codec;
use crate::raw::RawDocument;
use crate::storage::{AsyncStorageProvider, Blocking, StorageProvider};

/// Suffix appended to a file name to form its backup name.
pub const DEFAULT_BACKUP_SUFFIX: &str = "-backup";

/// Writes live data models to storage, one file per bound save-model kind.
pub struct GameSaver<K: ModelKind, P> {
    storage: Arc<P>,
    codec: Codec,
    backup_suffix: String,
    bindings: BindingTable<K, dyn SaveBinding<K>>,
}

impl<K, P> GameSaver<K, P>
where
    K: ModelKind,
    P: StorageProvider + AsyncStorageProvider,
{
    pub fn new(storage: Arc<P>, codec: Codec) -> Self {
        Self {
            storage,
            codec,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            bindings: BindingTable::new("save"),
        }
    }

    /// Replaces the backup suffix.
    ///
    /// An empty suffix would make the backup name collide with the file
    /// itself, so it falls back to [`DEFAULT_BACKUP_SUFFIX`].
    pub fn with_backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        if suffix.is_empty() {
            warn!(
                target: "save::saver",
                fallback = DEFAULT_BACKUP_SUFFIX,
                "Empty backup suffix ignored"
            );
            self.backup_suffix = DEFAULT_BACKUP_SUFFIX.to_string();
        } else {
            self.backup_suffix = suffix;
        }
        self
    }

    /// Binds `strategy` to `save_kind`, reading the model under `data_kind`.
    ///
    /// A kind that is already bound keeps its first strategy and
    /// [`PersistenceError::AlreadyBound`] is returned.
    pub fn add_strategy<S: SaveStrategy>(
        &mut self,
        save_kind: K,
        data_kind: K,
        strategy: S,
    ) -> Result<()> {
        self.bindings
            .bind(save_kind, Box::new(SaveEntry::new(strategy, data_kind)))
    }

    pub fn is_bound(&self, kind: K) -> bool {
        self.bindings.contains(kind)
    }

    /// Bound save-model kinds, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.bindings.keys()
    }

    /// Data-model kind read when saving `kind`.
    pub fn data_kind(&self, kind: K) -> Option<K> {
        self.bindings.get(kind).ok().map(|binding| binding.data_kind())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drops every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn storage(&self) -> &Arc<P> {
        &self.storage
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Storage name of the backup kept for `kind` during a save.
    pub fn backup_name(&self, kind: K) -> String {
        format!("{}{}", kind.name(), self.backup_suffix)
    }

    /// Saves one kind, blocking on storage I/O.
    pub fn save(&self, data: &GameData<K>, kind: K) -> Result<SaveOutcome> {
        let storage = Blocking(self.storage.as_ref());
        block_on(self.run_save(&storage, data, kind))
    }

    /// Saves one kind, suspending on storage I/O.
    pub async fn save_async(&self, data: &GameData<K>, kind: K) -> Result<SaveOutcome> {
        self.run_save(self.storage.as_ref(), data, kind).await
    }

    /// Saves every bound kind; one failure does not stop the rest.
    pub fn save_all(&self, data: &GameData<K>) -> BatchReport<K, SaveOutcome> {
        let storage = Blocking(self.storage.as_ref());
        block_on(self.run_save_all(&storage, data))
    }

    /// Suspending counterpart of [`GameSaver::save_all`].
    pub async fn save_all_async(&self, data: &GameData<K>) -> BatchReport<K, SaveOutcome> {
        self.run_save_all(self.storage.as_ref(), data).await
    }

    /// Exports every bound kind as one merged JSON document.
    ///
    /// The document maps each kind name to that kind's snapshot encoded as
    /// an embedded JSON string, independent of the configured codec. Any
    /// failing kind fails the whole export.
    pub fn raw_data(&self, data: &GameData<K>) -> Result<String> {
        let mut document = RawDocument::new();
        for (kind, binding) in self.bindings.iter() {
            let snapshot = binding.encode_json(kind, data)?;
            document.insert(kind.name(), snapshot);
        }
        document.encode()
    }

    async fn run_save_all<A>(&self, storage: &A, data: &GameData<K>) -> BatchReport<K, SaveOutcome>
    where
        A: AsyncStorageProvider + ?Sized,
    {
        let mut report = BatchReport::new();
        for kind in self.bindings.keys() {
            let result = self.run_save(storage, data, kind).await;
            report.record(kind, result);
        }
        report
    }

    async fn run_save<A>(&self, storage: &A, data: &GameData<K>, kind: K) -> Result<SaveOutcome>
    where
        A: AsyncStorageProvider + ?Sized,
    {
        let binding = self.bindings.get(kind).inspect_err(|e| {
            error!(target: "save::saver", kind = kind.name(), error = %e, "Save strategy not found");
        })?;

        let name = kind.name();
        let backup = self.backup_name(kind);
        let replaced = storage.exists(name).await;

        if replaced {
            self.take_backup(storage, name, &backup).await?;
        }

        match self.write(storage, binding, data, kind).await {
            Ok((version, bytes)) => {
                if storage.exists(&backup).await
                    && let Err(e) = storage.delete(&backup).await
                {
                    warn!(
                        target: "save::saver",
                        file = %backup,
                        error = %e,
                        "Failed to remove backup after commit"
                    );
                }

                info!(
                    target: "save::saver",
                    kind = name,
                    version,
                    bytes,
                    replaced,
                    "Saved"
                );

                Ok(SaveOutcome {
                    version,
                    bytes,
                    replaced,
                })
            }
            Err(cause) => {
                error!(
                    target: "save::saver",
                    kind = name,
                    strategy = binding.strategy_name(),
                    error = %cause,
                    "Save file failed, rolling back"
                );
                Err(self.rollback(storage, name, &backup, cause).await)
            }
        }
    }

    /// Replaces any stale backup with a copy of the current file.
    ///
    /// Runs before the primary file is touched; a failure here aborts the
    /// save with the primary intact.
    async fn take_backup<A>(&self, storage: &A, name: &str, backup: &str) -> Result<()>
    where
        A: AsyncStorageProvider + ?Sized,
    {
        if storage.exists(backup).await {
            storage
                .delete(backup)
                .await
                .map_err(PersistenceError::storage(backup))?;
        }
        storage
            .copy(name, backup)
            .await
            .map_err(PersistenceError::storage(backup))?;

        debug!(target: "save::saver", file = name, backup, "Backup taken");
        Ok(())
    }

    async fn write<A>(
        &self,
        storage: &A,
        binding: &dyn SaveBinding<K>,
        data: &GameData<K>,
        kind: K,
    ) -> Result<(u32, usize)>
    where
        A: AsyncStorageProvider + ?Sized,
    {
        let name = kind.name();
        let (bytes, version) = binding.encode(kind, data, &self.codec)?;
        storage
            .save(name, &bytes)
            .await
            .map_err(PersistenceError::storage(name))?;
        Ok((version, bytes.len()))
    }

    /// Restores the last committed file after a failed write.
    ///
    /// Returns `cause` when the restore succeeds, or
    /// [`PersistenceError::Rollback`] wrapping it when storage fails again.
    async fn rollback<A>(
        &self,
        storage: &A,
        name: &str,
        backup: &str,
        cause: PersistenceError,
    ) -> PersistenceError
    where
        A: AsyncStorageProvider + ?Sized,
    {
        let restored = async {
            storage.delete(name).await?;
            if storage.exists(backup).await {
                storage.copy(backup, name).await?;
                storage.delete(backup).await?;
                debug!(target: "save::saver", file = name, backup, "Restored from backup");
            }
            Ok::<(), crate::storage::StorageError>(())
        }
        .await;

        match restored {
            Ok(()) => cause,
            Err(source) => {
                error!(
                    target: "save::saver",
                    file = name,
                    error = %source,
                    "Rollback failed"
                );
                PersistenceError::Rollback {
                    name: name.to_string(),
                    cause: Box::new(cause),
                    source,
                }
            }
        }
    }
}
