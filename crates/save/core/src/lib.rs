//! Pure data contracts for the game-data persistence engine.
//!
//! `save-core` defines what is persisted and how it evolves, without knowing
//! where bytes go:
//! - [`kind`] names every data model and save model with a closed enum
//! - [`model`] holds the live-model and snapshot traits
//! - [`registry`] stores live models ([`GameData`]) and snapshots ([`GameSave`])
//! - [`converter`] upgrades old snapshots one schema version at a time
//! - [`strategy`] maps live models to snapshots and back
//!
//! The orchestration that reads and writes storage lives in `save-runtime`.
pub mod converter;
pub mod kind;
pub mod model;
pub mod registry;
pub mod strategy;

pub use converter::{ConverterChain, FnConverter, Migration, MigrationError, VersionConverter};
pub use kind::ModelKind;
pub use model::{DataModel, DynSaveModel, Entry, SaveModel};
pub use registry::{GameData, GameSave, Registry, RegistryError};
pub use strategy::{LoadOutcome, LoadStrategy, SaveStrategy, StrategyError};
