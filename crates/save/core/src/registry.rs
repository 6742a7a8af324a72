//! Keyed stores for live data models and save snapshots.
//!
//! Both registries share one implementation, [`Registry`], keyed by a
//! [`ModelKind`]. A kind holds at most one instance; registering a second
//! instance under a taken kind is rejected so live state is never silently
//! replaced.

use std::any::type_name;
use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;

use thiserror::Error;
use tracing::{debug, error};

use crate::kind::ModelKind;
use crate::model::{DataModel, DynSaveModel, Entry, SaveModel};

/// Errors surfaced by registry access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{registry} {kind} has already been added")]
    Duplicate {
        registry: &'static str,
        kind: &'static str,
    },

    #[error("{registry} {kind} holds {found}, not {expected}")]
    TypeMismatch {
        registry: &'static str,
        kind: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Live data models keyed by kind.
pub type GameData<K> = Registry<K, dyn DataModel>;

/// Save snapshots keyed by kind.
pub type GameSave<K> = Registry<K, dyn DynSaveModel>;

/// Map from kind to one boxed instance.
pub struct Registry<K, T: ?Sized> {
    label: &'static str,
    models: HashMap<K, Box<T>>,
}

impl<K: ModelKind, T: ?Sized + Entry> Registry<K, T> {
    fn with_label(label: &'static str) -> Self {
        Self {
            label,
            models: HashMap::new(),
        }
    }

    /// Registers a boxed instance under `kind`.
    ///
    /// A taken kind is left untouched and reported as
    /// [`RegistryError::Duplicate`].
    pub fn add_boxed(&mut self, kind: K, model: Box<T>) -> Result<(), RegistryError> {
        match self.models.entry(kind) {
            MapEntry::Occupied(_) => {
                error!(
                    target: "save::registry",
                    registry = self.label,
                    kind = kind.name(),
                    "Model has already been added"
                );
                Err(RegistryError::Duplicate {
                    registry: self.label,
                    kind: kind.name(),
                })
            }
            MapEntry::Vacant(slot) => {
                debug!(
                    target: "save::registry",
                    registry = self.label,
                    kind = kind.name(),
                    model = (*model).type_name(),
                    "Model added"
                );
                slot.insert(model);
                Ok(())
            }
        }
    }

    /// Removes and returns the instance under `kind`, if any.
    pub fn remove(&mut self, kind: K) -> Option<Box<T>> {
        self.models.remove(&kind)
    }

    pub fn get(&self, kind: K) -> Option<&T> {
        self.models.get(&kind).map(|model| model.as_ref())
    }

    pub fn get_mut(&mut self, kind: K) -> Option<&mut T> {
        self.models.get_mut(&kind).map(|model| model.as_mut())
    }

    /// Typed lookup.
    ///
    /// Returns `Ok(None)` for an unknown kind and
    /// [`RegistryError::TypeMismatch`] when the stored instance is not an `M`.
    pub fn get_typed<M: Entry>(&self, kind: K) -> Result<Option<&M>, RegistryError> {
        let Some(model) = self.models.get(&kind) else {
            return Ok(None);
        };
        let model: &T = model.as_ref();
        let found = model.type_name();
        model
            .as_any()
            .downcast_ref::<M>()
            .map(Some)
            .ok_or_else(|| self.mismatch::<M>(kind, found))
    }

    /// Mutable counterpart of [`Registry::get_typed`].
    pub fn get_typed_mut<M: Entry>(&mut self, kind: K) -> Result<Option<&mut M>, RegistryError> {
        let label = self.label;
        let Some(model) = self.models.get_mut(&kind) else {
            return Ok(None);
        };
        let model: &mut T = model.as_mut();
        let found = Entry::type_name(&*model);
        model
            .as_any_mut()
            .downcast_mut::<M>()
            .map(Some)
            .ok_or(RegistryError::TypeMismatch {
                registry: label,
                kind: kind.name(),
                expected: type_name::<M>(),
                found,
            })
    }

    pub fn contains(&self, kind: K) -> bool {
        self.models.contains_key(&kind)
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.models.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.models.iter().map(|(kind, model)| (*kind, model.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Drops every registered instance.
    pub fn clear(&mut self) {
        self.models.clear();
    }

    fn mismatch<M: Entry>(&self, kind: K, found: &'static str) -> RegistryError {
        RegistryError::TypeMismatch {
            registry: self.label,
            kind: kind.name(),
            expected: type_name::<M>(),
            found,
        }
    }
}

impl<K: ModelKind> Registry<K, dyn DataModel> {
    pub fn new() -> Self {
        Self::with_label("data model")
    }

    pub fn add<M: DataModel>(&mut self, kind: K, model: M) -> Result<(), RegistryError> {
        self.add_boxed(kind, Box::new(model))
    }

    pub fn add_default<M: DataModel + Default>(&mut self, kind: K) -> Result<(), RegistryError> {
        self.add(kind, M::default())
    }
}

impl<K: ModelKind> Default for Registry<K, dyn DataModel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ModelKind> Registry<K, dyn DynSaveModel> {
    pub fn new() -> Self {
        Self::with_label("save model")
    }

    pub fn add<S: SaveModel>(&mut self, kind: K, model: S) -> Result<(), RegistryError> {
        self.add_boxed(kind, Box::new(model))
    }

    pub fn add_default<S: SaveModel>(&mut self, kind: K) -> Result<(), RegistryError> {
        self.add(kind, S::default())
    }
}

impl<K: ModelKind> Default for Registry<K, dyn DynSaveModel> {
    fn default() -> Self {
        Self::new()
    }
}
