//! Closed kind identifiers for models and snapshots.
//!
//! Every registry and binding table is keyed by an embedding-defined enum
//! instead of runtime type names, so the set of persisted files is fixed at
//! compile time:
//!
//! ```ignore
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
//! enum Kind {
//!     Player,
//!     Settings,
//! }
//! ```
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of one data model or one save model.
///
/// [`ModelKind::name`] doubles as the persisted file name and as the key in
/// the merged raw export, so it must be stable across releases.
pub trait ModelKind: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    fn name(self) -> &'static str;
}

impl<T> ModelKind for T
where
    T: Copy + Eq + Hash + Debug + Send + Sync + 'static + Into<&'static str>,
{
    fn name(self) -> &'static str {
        self.into()
    }
}
