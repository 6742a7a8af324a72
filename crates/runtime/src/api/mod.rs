//! Public persistence API surface.
//!
//! Gathers the error and report types returned by the saver, the loader and
//! the [`SaveSystem`](crate::SaveSystem) façade.

pub mod errors;
pub mod report;

pub use errors::{PersistenceError, Result};
pub use report::{BatchReport, SaveOutcome};
