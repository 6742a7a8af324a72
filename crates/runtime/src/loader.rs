//! Read pipeline.
//!
//! `load(kind)` checks whether the file bound to `kind` exists. A stored file
//! is decoded into the bound snapshot type and migrated up to the live
//! version; a missing file yields a default snapshot and takes the first-load
//! path. Either way the result is applied onto the data model registered
//! under the bound data kind.
//!
//! Storage is only touched before the strategy runs, so the suspending form
//! yields on I/O and never inside conversion logic.

use std::sync::Arc;

use futures::executor::block_on;
use tracing::{debug, error, info};

use save_core::{GameData, LoadOutcome, LoadStrategy, ModelKind};

use crate::api::{BatchReport, PersistenceError, Result};
use crate::bindings::{BindingTable, LoadBinding, LoadEntry};
use crate::codec::Codec;
use crate::raw::RawDocument;
use crate::storage::{AsyncStorageProvider, Blocking, StorageProvider};

/// Applies stored snapshots onto live data models.
pub struct GameLoader<K: ModelKind, P> {
    storage: Arc<P>,
    codec: Codec,
    bindings: BindingTable<K, dyn LoadBinding<K>>,
}

impl<K, P> GameLoader<K, P>
where
    K: ModelKind,
    P: StorageProvider + AsyncStorageProvider,
{
    pub fn new(storage: Arc<P>, codec: Codec) -> Self {
        Self {
            storage,
            codec,
            bindings: BindingTable::new("load"),
        }
    }

    /// Binds `strategy` to `save_kind`, writing into the model under
    /// `data_kind`. A kind binds once; later attempts are rejected.
    pub fn add_strategy<L: LoadStrategy>(
        &mut self,
        save_kind: K,
        data_kind: K,
        strategy: L,
    ) -> Result<()> {
        self.bindings
            .bind(save_kind, Box::new(LoadEntry::new(strategy, data_kind)))
    }

    pub fn is_bound(&self, kind: K) -> bool {
        self.bindings.contains(kind)
    }

    pub fn keys(&self) -> Vec<K> {
        self.bindings.keys()
    }

    pub fn data_kind(&self, kind: K) -> Option<K> {
        self.bindings.get(kind).ok().map(|binding| binding.data_kind())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn storage(&self) -> &Arc<P> {
        &self.storage
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Loads one kind, blocking on storage I/O.
    pub fn load(&self, data: &mut GameData<K>, kind: K) -> Result<LoadOutcome> {
        let storage = Blocking(self.storage.as_ref());
        block_on(self.run_load(&storage, data, kind))
    }

    /// Loads one kind, suspending on storage I/O.
    pub async fn load_async(&self, data: &mut GameData<K>, kind: K) -> Result<LoadOutcome> {
        self.run_load(self.storage.as_ref(), data, kind).await
    }

    /// Loads every bound kind; one failure does not stop the rest.
    pub fn load_all(&self, data: &mut GameData<K>) -> BatchReport<K, LoadOutcome> {
        let storage = Blocking(self.storage.as_ref());
        block_on(self.run_load_all(&storage, data))
    }

    pub async fn load_all_async(&self, data: &mut GameData<K>) -> BatchReport<K, LoadOutcome> {
        self.run_load_all(self.storage.as_ref(), data).await
    }

    /// Applies a document produced by
    /// [`GameSaver::raw_data`](crate::GameSaver::raw_data).
    ///
    /// Entries go through migration as returning data, never the first-load
    /// path. Keys without a binding are skipped. Only an empty or malformed
    /// document fails the whole call; per-kind failures land in the report.
    pub fn load_from_raw_data(
        &self,
        data: &mut GameData<K>,
        raw: &str,
    ) -> Result<BatchReport<K, LoadOutcome>> {
        let document = RawDocument::decode(raw).inspect_err(|e| {
            error!(target: "save::loader", error = %e, "Rejected raw data");
        })?;

        let mut bound: Vec<(K, &dyn LoadBinding<K>)> = self.bindings.iter().collect();
        bound.sort_by_key(|&(kind, _)| kind.name());

        let mut report = BatchReport::new();
        for (kind, binding) in bound {
            let Some(snapshot) = document.get(kind.name()) else {
                continue;
            };
            let result = binding.apply_json(kind, snapshot, data);
            if let Err(e) = &result {
                error!(
                    target: "save::loader",
                    kind = kind.name(),
                    error = %e,
                    "Raw entry failed to load"
                );
            }
            report.record(kind, result);
        }

        for (name, _) in document.iter() {
            if !self.bindings.iter().any(|(kind, _)| kind.name() == name) {
                debug!(target: "save::loader", kind = name, "Ignored unbound raw entry");
            }
        }

        Ok(report)
    }

    async fn run_load_all<A>(&self, storage: &A, data: &mut GameData<K>) -> BatchReport<K, LoadOutcome>
    where
        A: AsyncStorageProvider + ?Sized,
    {
        let mut report = BatchReport::new();
        for kind in self.bindings.keys() {
            let result = self.run_load(storage, data, kind).await;
            report.record(kind, result);
        }
        report
    }

    async fn run_load<A>(&self, storage: &A, data: &mut GameData<K>, kind: K) -> Result<LoadOutcome>
    where
        A: AsyncStorageProvider + ?Sized,
    {
        let result = self.read_and_apply(storage, data, kind).await;
        match &result {
            Ok(outcome) => {
                info!(target: "save::loader", kind = kind.name(), ?outcome, "Loaded");
            }
            Err(e) => {
                let strategy = self
                    .bindings
                    .get(kind)
                    .map_or("unbound", |binding| binding.strategy_name());
                error!(
                    target: "save::loader",
                    kind = kind.name(),
                    strategy,
                    error = %e,
                    "Load file failed"
                );
            }
        }
        result
    }

    async fn read_and_apply<A>(
        &self,
        storage: &A,
        data: &mut GameData<K>,
        kind: K,
    ) -> Result<LoadOutcome>
    where
        A: AsyncStorageProvider + ?Sized,
    {
        let binding = self.bindings.get(kind)?;
        let name = kind.name();

        let stored = if storage.exists(name).await {
            let bytes = storage
                .load(name)
                .await
                .map_err(PersistenceError::storage(name))?;
            Some(bytes)
        } else {
            debug!(target: "save::loader", kind = name, "No stored file, first load");
            None
        };

        binding.apply(kind, stored, &self.codec, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use save_core::{ConverterChain, DataModel, SaveModel};
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
    enum Kind {
        Options,
        OptionsSave,
    }

    #[derive(Debug, Default)]
    struct Options {
        volume: u8,
    }

    impl DataModel for Options {
        fn version(&self) -> u32 {
            1
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct OptionsSave {
        version: u32,
        volume: u8,
    }

    impl SaveModel for OptionsSave {
        fn version(&self) -> u32 {
            self.version
        }

        fn set_version(&mut self, version: u32) {
            self.version = version;
        }
    }

    struct OptionsStrategy {
        chain: ConverterChain<OptionsSave>,
    }

    impl OptionsStrategy {
        fn new() -> Self {
            let mut chain = ConverterChain::new();
            chain
                .add_fn(0, 1, |mut save: OptionsSave| {
                    save.volume = save.volume.saturating_mul(10);
                    save
                })
                .unwrap();
            Self { chain }
        }
    }

    impl LoadStrategy for OptionsStrategy {
        type Save = OptionsSave;
        type Data = Options;

        fn converters(&self) -> &ConverterChain<OptionsSave> {
            &self.chain
        }

        fn on_first_load(&self, data: &mut Options) {
            data.volume = 80;
        }

        fn on_load(&self, snapshot: OptionsSave, data: &mut Options) {
            data.volume = snapshot.volume;
        }
    }

    fn setup() -> (GameLoader<Kind, MemoryStorage>, GameData<Kind>) {
        let mut loader = GameLoader::new(Arc::new(MemoryStorage::new()), Codec::default());
        loader
            .add_strategy(Kind::OptionsSave, Kind::Options, OptionsStrategy::new())
            .unwrap();

        let mut data = GameData::new();
        data.add_default::<Options>(Kind::Options).unwrap();
        (loader, data)
    }

    fn volume(data: &GameData<Kind>) -> u8 {
        data.get_typed::<Options>(Kind::Options)
            .unwrap()
            .unwrap()
            .volume
    }

    #[test]
    fn test_missing_file_is_first_load() {
        let (loader, mut data) = setup();

        let outcome = loader.load(&mut data, Kind::OptionsSave).unwrap();
        assert_eq!(outcome, LoadOutcome::FirstLoad);
        assert_eq!(volume(&data), 80);
    }

    #[test]
    fn test_stored_file_is_migrated() {
        let (loader, mut data) = setup();
        StorageProvider::save(
            loader.storage().as_ref(),
            "OptionsSave",
            br#"{"version":0,"volume":3}"#,
        )
        .unwrap();

        let outcome = loader.load(&mut data, Kind::OptionsSave).unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Migrated {
                from: 0,
                to: 1,
                steps: 1
            }
        );
        assert_eq!(volume(&data), 30);
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let (loader, mut data) = setup();
        StorageProvider::save(loader.storage().as_ref(), "OptionsSave", b"{not json").unwrap();

        let err = loader.load(&mut data, Kind::OptionsSave).unwrap_err();
        assert!(matches!(err, PersistenceError::Decode { .. }));
        assert_eq!(volume(&data), 0);

        let binding = loader.bindings.get(Kind::OptionsSave).unwrap();
        assert!(binding.strategy_name().ends_with("OptionsStrategy"));
    }

    #[test]
    fn test_unbound_kind() {
        let (loader, mut data) = setup();

        let err = loader.load(&mut data, Kind::Options).unwrap_err();
        assert!(matches!(err, PersistenceError::NotRegistered { kind: "Options" }));
    }

    #[test]
    fn test_raw_data_skips_unknown_keys() {
        let (loader, mut data) = setup();
        let raw = r#"{"OptionsSave":"{\"version\":1,\"volume\":42}","Ghost":"{}"}"#;

        let report = loader.load_from_raw_data(&mut data, raw).unwrap();
        assert!(report.is_success());
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.get(Kind::OptionsSave),
            Some(&LoadOutcome::Current { version: 1 })
        );
        assert_eq!(volume(&data), 42);
    }

    #[test]
    fn test_raw_data_never_first_load() {
        let (loader, mut data) = setup();
        let raw = r#"{"OptionsSave":"{\"version\":0,\"volume\":2}"}"#;

        let report = loader.load_from_raw_data(&mut data, raw).unwrap();
        assert!(matches!(
            report.get(Kind::OptionsSave),
            Some(LoadOutcome::Migrated { .. })
        ));
        assert_eq!(volume(&data), 20);
    }

    #[test]
    fn test_raw_data_rejects_empty() {
        let (loader, mut data) = setup();

        assert!(matches!(
            loader.load_from_raw_data(&mut data, ""),
            Err(PersistenceError::EmptyRawData)
        ));
    }

    #[tokio::test]
    async fn test_load_all_async_collects_failures() {
        let (loader, mut data) = setup();
        let mut empty = GameData::new();

        let report = loader.load_all_async(&mut empty).await;
        assert!(!report.is_success());
        assert!(matches!(
            report.error(Kind::OptionsSave),
            Some(PersistenceError::DataModelMissing { kind: "Options" })
        ));

        let report = loader.load_all_async(&mut data).await;
        assert!(report.is_success());
    }
}
