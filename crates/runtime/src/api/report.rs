//! Outcomes returned by per-kind and aggregate operations.

use save_core::ModelKind;

use super::PersistenceError;

/// Result of one successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Version stamped on the written snapshot.
    pub version: u32,
    /// Encoded size handed to storage.
    pub bytes: usize,
    /// Whether a previous file was replaced (and backed up meanwhile).
    pub replaced: bool,
}

/// Per-kind results of an aggregate operation.
///
/// One kind failing never stops the others; failures are collected here with
/// the kind they belong to.
#[derive(Debug)]
pub struct BatchReport<K, T> {
    pub succeeded: Vec<(K, T)>,
    pub failed: Vec<(K, PersistenceError)>,
}

impl<K: ModelKind, T> BatchReport<K, T> {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: K, result: Result<T, PersistenceError>) {
        match result {
            Ok(value) => self.succeeded.push((kind, value)),
            Err(err) => self.failed.push((kind, err)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of kinds processed.
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, kind: K) -> Option<&T> {
        self.succeeded
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, value)| value)
    }

    pub fn error(&self, kind: K) -> Option<&PersistenceError> {
        self.failed
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, err)| err)
    }
}

impl<K: ModelKind, T> Default for BatchReport<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
