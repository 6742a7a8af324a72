//! One-stop façade over data models, saver and loader.
//!
//! [`SaveSystem`] owns the live [`GameData`] together with a [`GameSaver`] and
//! a [`GameLoader`] that share one storage provider and codec. Embeddings that
//! need finer control can still drive the saver and loader directly.

use std::sync::Arc;

use tracing::debug;

use save_core::{DataModel, GameData, LoadOutcome, LoadStrategy, ModelKind, SaveStrategy};

use crate::api::{BatchReport, PersistenceError, Result, SaveOutcome};
use crate::codec::Codec;
use crate::config::PersistenceConfig;
use crate::loader::GameLoader;
use crate::saver::{DEFAULT_BACKUP_SUFFIX, GameSaver};
use crate::storage::{AsyncStorageProvider, FileStorage, StorageProvider};

type Binder<K, P> =
    Box<dyn FnOnce(&mut GameSaver<K, P>, &mut GameLoader<K, P>) -> Result<()> + Send>;

/// Live data plus the pipelines that persist it.
pub struct SaveSystem<K: ModelKind, P> {
    data: GameData<K>,
    saver: GameSaver<K, P>,
    loader: GameLoader<K, P>,
}

impl<K, P> SaveSystem<K, P>
where
    K: ModelKind,
    P: StorageProvider + AsyncStorageProvider,
{
    /// Create a new builder over `storage`.
    pub fn builder(storage: Arc<P>) -> SaveSystemBuilder<K, P> {
        SaveSystemBuilder::new(storage)
    }

    pub fn data(&self) -> &GameData<K> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut GameData<K> {
        &mut self.data
    }

    pub fn saver(&self) -> &GameSaver<K, P> {
        &self.saver
    }

    pub fn loader(&self) -> &GameLoader<K, P> {
        &self.loader
    }

    pub fn save(&self, kind: K) -> Result<SaveOutcome> {
        self.saver.save(&self.data, kind)
    }

    pub async fn save_async(&self, kind: K) -> Result<SaveOutcome> {
        self.saver.save_async(&self.data, kind).await
    }

    pub fn save_all(&self) -> BatchReport<K, SaveOutcome> {
        self.saver.save_all(&self.data)
    }

    pub async fn save_all_async(&self) -> BatchReport<K, SaveOutcome> {
        self.saver.save_all_async(&self.data).await
    }

    pub fn load(&mut self, kind: K) -> Result<LoadOutcome> {
        self.loader.load(&mut self.data, kind)
    }

    pub async fn load_async(&mut self, kind: K) -> Result<LoadOutcome> {
        self.loader.load_async(&mut self.data, kind).await
    }

    pub fn load_all(&mut self) -> BatchReport<K, LoadOutcome> {
        self.loader.load_all(&mut self.data)
    }

    pub async fn load_all_async(&mut self) -> BatchReport<K, LoadOutcome> {
        self.loader.load_all_async(&mut self.data).await
    }

    /// Merged JSON document of every bound kind.
    pub fn export_raw(&self) -> Result<String> {
        self.saver.raw_data(&self.data)
    }

    /// Applies a document produced by [`SaveSystem::export_raw`].
    pub fn import_raw(&mut self, raw: &str) -> Result<BatchReport<K, LoadOutcome>> {
        self.loader.load_from_raw_data(&mut self.data, raw)
    }
}

impl<K: ModelKind> SaveSystem<K, FileStorage> {
    /// Builder over file storage, format and transforms taken from `config`.
    pub fn from_config(config: &PersistenceConfig) -> Result<SaveSystemBuilder<K, FileStorage>> {
        let storage = config
            .file_storage()
            .map_err(|source| PersistenceError::Storage {
                name: config.save_dir.display().to_string(),
                source,
            })?;
        Ok(Self::builder(Arc::new(storage)).config(config))
    }
}

/// Builder for [`SaveSystem`].
///
/// Registration errors are held until [`SaveSystemBuilder::build`], which
/// reports the first one.
pub struct SaveSystemBuilder<K: ModelKind, P> {
    storage: Arc<P>,
    codec: Codec,
    backup_suffix: String,
    data: GameData<K>,
    binders: Vec<Binder<K, P>>,
    error: Option<PersistenceError>,
}

impl<K, P> SaveSystemBuilder<K, P>
where
    K: ModelKind,
    P: StorageProvider + AsyncStorageProvider,
{
    fn new(storage: Arc<P>) -> Self {
        Self {
            storage,
            codec: Codec::default(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            data: GameData::new(),
            binders: Vec::new(),
            error: None,
        }
    }

    /// Take codec and backup suffix from `config`
    pub fn config(mut self, config: &PersistenceConfig) -> Self {
        self.codec = config.codec();
        self.backup_suffix = config.backup_suffix.clone();
        self
    }

    /// Override the snapshot codec
    pub fn codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Register a live data model
    pub fn model<M: DataModel>(mut self, kind: K, model: M) -> Self {
        if let Err(e) = self.data.add(kind, model) {
            self.error.get_or_insert(e.into());
        }
        self
    }

    /// Bind one strategy to `save_kind` in both directions.
    ///
    /// `strategy` reads and writes the data model registered under
    /// `data_kind`.
    pub fn bind<S>(mut self, save_kind: K, data_kind: K, strategy: S) -> Self
    where
        S: SaveStrategy
            + LoadStrategy<Save = <S as SaveStrategy>::Save, Data = <S as SaveStrategy>::Data>,
    {
        let shared = Arc::new(strategy);
        self.binders.push(Box::new(
            move |saver: &mut GameSaver<K, P>, loader: &mut GameLoader<K, P>| {
                saver.add_strategy(save_kind, data_kind, Arc::clone(&shared))?;
                loader.add_strategy(save_kind, data_kind, shared)
            },
        ));
        self
    }

    /// Build the save system
    pub fn build(self) -> Result<SaveSystem<K, P>> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let mut saver = GameSaver::new(Arc::clone(&self.storage), self.codec.clone())
            .with_backup_suffix(self.backup_suffix);
        let mut loader = GameLoader::new(self.storage, self.codec);

        for binder in self.binders {
            binder(&mut saver, &mut loader)?;
        }

        debug!(
            target: "save::system",
            models = self.data.len(),
            bindings = saver.len(),
            "Save system built"
        );

        Ok(SaveSystem {
            data: self.data,
            saver,
            loader,
        })
    }
}
