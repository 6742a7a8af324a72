//! Error types raised by storage providers.

use thiserror::Error;

/// Errors surfaced by storage providers.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage lock was poisoned")]
    LockPoisoned,

    #[error("no stored file named {0}")]
    NotFound(String),

    #[error("invalid storage name: {0:?}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
