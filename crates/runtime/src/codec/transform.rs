//! Byte-level transforms applied after serialization.

use sha2::{Digest, Sha256};

use super::CodecError;

const DIGEST_LEN: usize = 32;

/// Reversible byte transform (integrity tag, obfuscation, compression, ...).
///
/// `reverse(apply(bytes))` must return `bytes`. Transforms are pure CPU
/// work and never touch storage.
pub trait DataTransform: Send + Sync {
    fn apply(&self, data: Vec<u8>) -> Result<Vec<u8>, CodecError>;

    fn reverse(&self, data: Vec<u8>) -> Result<Vec<u8>, CodecError>;
}

/// Prefixes the payload with its SHA-256 digest and verifies it on read.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checksum;

impl DataTransform for Checksum {
    fn apply(&self, data: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let digest = Sha256::digest(&data);
        let mut tagged = Vec::with_capacity(DIGEST_LEN + data.len());
        tagged.extend_from_slice(&digest);
        tagged.extend_from_slice(&data);
        Ok(tagged)
    }

    fn reverse(&self, mut data: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        if data.len() < DIGEST_LEN {
            return Err(CodecError::Truncated {
                len: data.len(),
                min: DIGEST_LEN,
            });
        }

        let payload = data.split_off(DIGEST_LEN);
        let actual = Sha256::digest(&payload);
        if actual.as_slice() != data.as_slice() {
            return Err(CodecError::ChecksumMismatch {
                expected: hex::encode(&data),
                actual: hex::encode(actual),
            });
        }

        Ok(payload)
    }
}

/// Repeating-key XOR mask.
///
/// Keeps casual edits out of save files; it is not encryption.
#[derive(Debug, Clone)]
pub struct XorMask {
    key: Vec<u8>,
}

impl XorMask {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    fn mask(&self, mut data: Vec<u8>) -> Vec<u8> {
        if self.key.is_empty() {
            return data;
        }
        for (byte, key) in data.iter_mut().zip(self.key.iter().cycle()) {
            *byte ^= key;
        }
        data
    }
}

impl DataTransform for XorMask {
    fn apply(&self, data: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(self.mask(data))
    }

    fn reverse(&self, data: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(self.mask(data))
    }
}
