//! Storage providers for persisted snapshots.
//!
//! Storage is a flat namespace of named byte blobs. The engine decides *what*
//! bytes to write (see [`crate::codec`]); a provider only decides *where*.
//!
//! Every provider offers a blocking form ([`StorageProvider`]) and a
//! suspending form ([`AsyncStorageProvider`]) with the same semantics.

mod blocking;
mod error;
mod file;
mod memory;
mod traits;

pub use blocking::Blocking;
pub use error::{Result, StorageError};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::{AsyncStorageProvider, StorageProvider};
