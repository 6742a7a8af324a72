//! Unified error type surfaced by the persistence API.
//!
//! Wraps failures from registries, strategies, migration, encoding and
//! storage with the kind or file name they happened on, so callers can log
//! or match them without extra context.

use thiserror::Error;

use save_core::{MigrationError, RegistryError, StrategyError};

use crate::codec::CodecError;
use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, PersistenceError>;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no strategy bound for {kind}")]
    NotRegistered { kind: &'static str },

    #[error("strategy for {kind} has already been added")]
    AlreadyBound { kind: &'static str },

    #[error("data model {kind} is not registered")]
    DataModelMissing { kind: &'static str },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("save strategy for {kind} failed")]
    Strategy {
        kind: &'static str,
        #[source]
        source: StrategyError,
    },

    #[error("migration of {kind} failed")]
    Migration {
        kind: &'static str,
        #[source]
        source: MigrationError,
    },

    #[error("failed to encode {name}")]
    Encode {
        name: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to decode {name}")]
    Decode {
        name: String,
        #[source]
        source: CodecError,
    },

    #[error("storage failure on {name}")]
    Storage {
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("rollback of {name} failed after: {cause}")]
    Rollback {
        name: String,
        cause: Box<PersistenceError>,
        #[source]
        source: StorageError,
    },

    #[error("raw data is empty")]
    EmptyRawData,

    #[error("raw data is malformed")]
    RawData(#[source] serde_json::Error),
}

impl PersistenceError {
    pub(crate) fn storage(name: &str) -> impl FnOnce(StorageError) -> Self + '_ {
        move |source| Self::Storage {
            name: name.to_string(),
            source,
        }
    }

    /// Whether the persisted file may differ from its state before the call.
    ///
    /// Only a failed rollback can leave storage in an unknown state.
    pub fn is_rollback_failure(&self) -> bool {
        matches!(self, Self::Rollback { .. })
    }
}
