//! Live data models and their persisted snapshots.
//!
//! A *data model* is mutable in-memory state owned by [`GameData`](crate::GameData);
//! its [`DataModel::version`] is the schema revision of the running code.
//! A *save model* is a plain serializable snapshot; its
//! [`SaveModel::version`] records the revision it was written at.

use std::any::Any;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Type-erased access shared by everything stored in a registry.
///
/// Blanket-implemented for every `Any + Send + Sync` type; never implement it
/// by hand.
pub trait Entry: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Concrete type name, used in mismatch diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> Entry for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Live domain state with a current schema version.
pub trait DataModel: Entry {
    /// Schema revision the running code expects for this model.
    fn version(&self) -> u32;
}

/// Serializable snapshot of one data model at a specific version.
///
/// `Default` is the fresh-install snapshot synthesized when no file exists.
pub trait SaveModel: Entry + Serialize + DeserializeOwned + Default {
    /// Version this snapshot instance was written at.
    fn version(&self) -> u32;

    fn set_version(&mut self, version: u32);
}

/// Object-safe view of a [`SaveModel`], stored in [`GameSave`](crate::GameSave).
pub trait DynSaveModel: Entry {
    fn version(&self) -> u32;
}

impl<T: SaveModel> DynSaveModel for T {
    fn version(&self) -> u32 {
        SaveModel::version(self)
    }
}
