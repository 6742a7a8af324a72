//! Snapshot encoding.
//!
//! A [`Codec`] turns a snapshot into the bytes handed to storage: serialize
//! with the configured [`SnapshotFormat`], then run the bytes through each
//! [`DataTransform`] in order. Decoding reverses the transforms in reverse
//! order before deserializing.

mod format;
mod transform;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use format::SnapshotFormat;
pub use transform::{Checksum, DataTransform, XorMask};

/// Errors raised while encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("RON error: {0}")]
    Ron(String),

    #[error("snapshot is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("payload truncated: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },

    #[error("{0}")]
    Transform(String),
}

/// Serialization format plus byte transforms, applied to every snapshot.
#[derive(Clone, Default)]
pub struct Codec {
    format: SnapshotFormat,
    transforms: Vec<Arc<dyn DataTransform>>,
}

impl Codec {
    pub fn new(format: SnapshotFormat) -> Self {
        Self {
            format,
            transforms: Vec::new(),
        }
    }

    /// Append a transform; it runs after every transform already added.
    pub fn with_transform(mut self, transform: impl DataTransform + 'static) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    pub fn format(&self) -> SnapshotFormat {
        self.format
    }

    pub fn transform_count(&self) -> usize {
        self.transforms.len()
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let bytes = self.format.serialize(value)?;
        self.transforms
            .iter()
            .try_fold(bytes, |bytes, transform| transform.apply(bytes))
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: Vec<u8>) -> Result<T, CodecError> {
        let bytes = self
            .transforms
            .iter()
            .rev()
            .try_fold(bytes, |bytes, transform| transform.reverse(bytes))?;
        self.format.deserialize(&bytes)
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("format", &self.format)
            .field("transforms", &self.transforms.len())
            .finish()
    }
}
