//! Merged JSON export of every bound kind.
//!
//! # Format
//!
//! ```json
//! { "PlayerSave": "{\"version\":3,\"gold\":10}", "Settings": "{...}" }
//! ```
//!
//! Each value is a complete JSON snapshot carried as a string, so one kind's
//! schema never leaks into another's. Keys are kind names and serialize in
//! sorted order.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::api::{PersistenceError, Result};

/// Kind name to embedded snapshot JSON.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawDocument {
    entries: BTreeMap<String, String>,
}

impl RawDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: &str, snapshot: String) {
        self.entries.insert(kind.to_string(), snapshot);
    }

    pub fn get(&self, kind: &str) -> Option<&str> {
        self.entries.get(kind).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(kind, snapshot)| (kind.as_str(), snapshot.as_str()))
    }

    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.entries).map_err(PersistenceError::RawData)
    }

    /// Parses a merged document.
    ///
    /// Blank input is [`PersistenceError::EmptyRawData`]. A value that is not
    /// a string is kept as its JSON text and fails later when that kind is
    /// decoded, so one bad entry does not hide the rest.
    pub fn decode(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(PersistenceError::EmptyRawData);
        }

        let object: BTreeMap<String, Value> =
            serde_json::from_str(raw).map_err(PersistenceError::RawData)?;

        let entries = object
            .into_iter()
            .map(|(kind, value)| {
                let snapshot = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (kind, snapshot)
            })
            .collect();

        Ok(Self { entries })
    }
}
