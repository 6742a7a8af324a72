//! Binding tables from save-model kind to typed strategy.
//!
//! The saver and the loader each keep one table. An entry remembers the
//! concrete strategy and the data-model kind it reads or writes, and hides
//! both behind a small object-safe trait so tables can hold many kinds.

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;

use tracing::error;

use save_core::{
    DataModel, GameData, LoadOutcome, LoadStrategy, ModelKind, SaveModel, SaveStrategy,
};

use crate::api::{PersistenceError, Result};
use crate::codec::{Codec, CodecError};

/// Kind-keyed table; each save-model kind binds exactly once.
pub(crate) struct BindingTable<K, B: ?Sized> {
    role: &'static str,
    entries: HashMap<K, Box<B>>,
}

impl<K: ModelKind, B: ?Sized> BindingTable<K, B> {
    pub(crate) fn new(role: &'static str) -> Self {
        Self {
            role,
            entries: HashMap::new(),
        }
    }

    /// Registers `binding` for `kind`; a bound kind keeps its first binding.
    pub(crate) fn bind(&mut self, kind: K, binding: Box<B>) -> Result<()> {
        match self.entries.entry(kind) {
            MapEntry::Occupied(_) => {
                error!(
                    target: "save::bindings",
                    role = self.role,
                    kind = kind.name(),
                    "Strategy has already been added"
                );
                Err(PersistenceError::AlreadyBound { kind: kind.name() })
            }
            MapEntry::Vacant(slot) => {
                slot.insert(binding);
                Ok(())
            }
        }
    }

    pub(crate) fn get(&self, kind: K) -> Result<&B> {
        self.entries
            .get(&kind)
            .map(|binding| binding.as_ref())
            .ok_or(PersistenceError::NotRegistered { kind: kind.name() })
    }

    pub(crate) fn contains(&self, kind: K) -> bool {
        self.entries.contains_key(&kind)
    }

    pub(crate) fn keys(&self) -> Vec<K> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (K, &B)> + '_ {
        self.entries
            .iter()
            .map(|(kind, binding)| (*kind, binding.as_ref()))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

// ============================================================================
// Save direction
// ============================================================================

/// Type-erased save binding.
pub(crate) trait SaveBinding<K: ModelKind>: Send + Sync {
    fn data_kind(&self) -> K;

    fn strategy_name(&self) -> &'static str;

    /// Snapshot the bound data model and encode it with `codec`.
    ///
    /// Returns the encoded bytes and the version stamped on the snapshot.
    fn encode(&self, kind: K, data: &GameData<K>, codec: &Codec) -> Result<(Vec<u8>, u32)>;

    /// Snapshot the bound data model as a standalone JSON document.
    fn encode_json(&self, kind: K, data: &GameData<K>) -> Result<String>;
}

pub(crate) struct SaveEntry<K, S> {
    strategy: S,
    data_kind: K,
}

impl<K: ModelKind, S: SaveStrategy> SaveEntry<K, S> {
    pub(crate) fn new(strategy: S, data_kind: K) -> Self {
        Self {
            strategy,
            data_kind,
        }
    }

    fn snapshot(&self, kind: K, data: &GameData<K>) -> Result<S::Save> {
        let model = data
            .get_typed::<S::Data>(self.data_kind)?
            .ok_or(PersistenceError::DataModelMissing {
                kind: self.data_kind.name(),
            })?;

        let mut snapshot = self
            .strategy
            .save(model)
            .map_err(|source| PersistenceError::Strategy {
                kind: kind.name(),
                source,
            })?;
        snapshot.set_version(model.version());
        Ok(snapshot)
    }
}

impl<K: ModelKind, S: SaveStrategy> SaveBinding<K> for SaveEntry<K, S> {
    fn data_kind(&self) -> K {
        self.data_kind
    }

    fn strategy_name(&self) -> &'static str {
        std::any::type_name::<S>()
    }

    fn encode(&self, kind: K, data: &GameData<K>, codec: &Codec) -> Result<(Vec<u8>, u32)> {
        let snapshot = self.snapshot(kind, data)?;
        let version = snapshot.version();
        let bytes = codec
            .encode(&snapshot)
            .map_err(|source| PersistenceError::Encode {
                name: kind.name().to_string(),
                source,
            })?;
        Ok((bytes, version))
    }

    fn encode_json(&self, kind: K, data: &GameData<K>) -> Result<String> {
        let snapshot = self.snapshot(kind, data)?;
        serde_json::to_string(&snapshot).map_err(|e| PersistenceError::Encode {
            name: kind.name().to_string(),
            source: CodecError::Json(e),
        })
    }
}

// ============================================================================
// Load direction
// ============================================================================

/// Type-erased load binding.
pub(crate) trait LoadBinding<K: ModelKind>: Send + Sync {
    fn data_kind(&self) -> K;

    fn strategy_name(&self) -> &'static str;

    /// Decode `stored` (or synthesize a default when absent) and apply it.
    ///
    /// An absent snapshot takes the first-load path.
    fn apply(
        &self,
        kind: K,
        stored: Option<Vec<u8>>,
        codec: &Codec,
        data: &mut GameData<K>,
    ) -> Result<LoadOutcome>;

    /// Decode a standalone JSON snapshot and apply it as returning data.
    fn apply_json(&self, kind: K, json: &str, data: &mut GameData<K>) -> Result<LoadOutcome>;
}

pub(crate) struct LoadEntry<K, L> {
    strategy: L,
    data_kind: K,
}

impl<K: ModelKind, L: LoadStrategy> LoadEntry<K, L> {
    pub(crate) fn new(strategy: L, data_kind: K) -> Self {
        Self {
            strategy,
            data_kind,
        }
    }

    fn run(
        &self,
        kind: K,
        snapshot: L::Save,
        first_load: bool,
        data: &mut GameData<K>,
    ) -> Result<LoadOutcome> {
        let model = data
            .get_typed_mut::<L::Data>(self.data_kind)?
            .ok_or(PersistenceError::DataModelMissing {
                kind: self.data_kind.name(),
            })?;

        self.strategy
            .load(snapshot, model, first_load)
            .map_err(|source| PersistenceError::Migration {
                kind: kind.name(),
                source,
            })
    }
}

impl<K: ModelKind, L: LoadStrategy> LoadBinding<K> for LoadEntry<K, L> {
    fn data_kind(&self) -> K {
        self.data_kind
    }

    fn strategy_name(&self) -> &'static str {
        std::any::type_name::<L>()
    }

    fn apply(
        &self,
        kind: K,
        stored: Option<Vec<u8>>,
        codec: &Codec,
        data: &mut GameData<K>,
    ) -> Result<LoadOutcome> {
        let (snapshot, first_load) = match stored {
            Some(bytes) => {
                let snapshot =
                    codec
                        .decode::<L::Save>(bytes)
                        .map_err(|source| PersistenceError::Decode {
                            name: kind.name().to_string(),
                            source,
                        })?;
                (snapshot, false)
            }
            None => (L::Save::default(), true),
        };

        self.run(kind, snapshot, first_load, data)
    }

    fn apply_json(&self, kind: K, json: &str, data: &mut GameData<K>) -> Result<LoadOutcome> {
        let snapshot =
            serde_json::from_str::<L::Save>(json).map_err(|e| PersistenceError::Decode {
                name: kind.name().to_string(),
                source: CodecError::Json(e),
            })?;

        self.run(kind, snapshot, false, data)
    }
}
