//! Serialization formats for individual snapshots.

use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::{Display, EnumString};

use super::CodecError;

/// Encoding used for every snapshot written through a [`Codec`](super::Codec).
///
/// JSON and RON are self-describing and readable by the `xtask inspect`
/// command; bincode is compact but opaque.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SnapshotFormat {
    #[default]
    Json,
    Bincode,
    Ron,
}

impl SnapshotFormat {
    /// Whether the encoded form carries its own field names.
    pub fn is_self_describing(self) -> bool {
        !matches!(self, Self::Bincode)
    }

    pub(super) fn serialize<T: Serialize>(self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Json => Ok(serde_json::to_vec(value)?),
            Self::Bincode => Ok(bincode::serialize(value)?),
            Self::Ron => ron::to_string(value)
                .map(String::into_bytes)
                .map_err(|e| CodecError::Ron(e.to_string())),
        }
    }

    pub(super) fn deserialize<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CodecError> {
        match self {
            Self::Json => Ok(serde_json::from_slice(bytes)?),
            Self::Bincode => Ok(bincode::deserialize(bytes)?),
            Self::Ron => {
                let text = std::str::from_utf8(bytes)?;
                ron::from_str(text).map_err(|e| CodecError::Ron(e.to_string()))
            }
        }
    }
}
