//! Save/load orchestration for versioned game data.
//!
//! This crate wires the pure model and strategy contracts from `save-core`
//! to durable storage. Consumers register live models and strategies, then
//! persist them through [`GameSaver`] and restore them through
//! [`GameLoader`], or embed both behind [`SaveSystem`].
//!
//! Modules are organized by responsibility:
//! - [`saver`] hosts the transactional write pipeline (backup, write, commit or rollback)
//! - [`loader`] hosts the read pipeline (decode or default, migrate, apply)
//! - [`storage`] defines the provider contract and the file/memory providers
//! - [`codec`] turns snapshots into bytes and back, with optional transforms
//! - [`api`] exposes the error and report types downstream clients match on
//! - [`config`] and [`system`] provide environment-driven setup and the façade
pub mod api;
pub mod codec;
pub mod config;
pub mod loader;
pub mod raw;
pub mod saver;
pub mod storage;
pub mod system;

mod bindings;

pub use api::{BatchReport, PersistenceError, Result, SaveOutcome};
pub use codec::{Checksum, Codec, CodecError, DataTransform, SnapshotFormat, XorMask};
pub use config::{PersistenceConfig, default_save_dir};
pub use loader::GameLoader;
pub use raw::RawDocument;
pub use saver::{DEFAULT_BACKUP_SUFFIX, GameSaver};
pub use storage::{
    AsyncStorageProvider, Blocking, FileStorage, MemoryStorage, StorageError, StorageProvider,
};
pub use system::{SaveSystem, SaveSystemBuilder};

pub use save_core::{
    ConverterChain, DataModel, FnConverter, GameData, GameSave, LoadOutcome, LoadStrategy,
    ModelKind, SaveModel, SaveStrategy, StrategyError, VersionConverter,
};
