//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod clean;
mod inspect;
mod restore;

pub use clean::Clean;
pub use inspect::Inspect;
pub use restore::Restore;
