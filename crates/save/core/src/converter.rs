//! Version converters and the migration chain.
//!
//! Each converter upgrades a snapshot from one schema version to a strictly
//! newer one. A [`ConverterChain`] holds at most one converter per source
//! version and applies them in sequence until the snapshot reaches the live
//! model's version.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use thiserror::Error;
use tracing::trace;

use crate::model::SaveModel;

/// Errors raised while building or walking a converter chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MigrationError {
    #[error("no converter from version {from} (target {target})")]
    Gap { from: u32, target: u32 },

    #[error("converter from version {from} has already been added")]
    DuplicateConverter { from: u32 },

    #[error("converter {from} -> {to} does not move forward")]
    NonIncreasing { from: u32, to: u32 },
}

/// Single-step upgrade of a snapshot.
pub trait VersionConverter<S>: Send + Sync {
    fn from_version(&self) -> u32;

    fn to_version(&self) -> u32;

    fn convert(&self, from: S) -> S;
}

/// Closure-backed [`VersionConverter`].
pub struct FnConverter<S, F> {
    from: u32,
    to: u32,
    convert: F,
    _snapshot: PhantomData<fn(S) -> S>,
}

impl<S, F> FnConverter<S, F>
where
    F: Fn(S) -> S + Send + Sync,
{
    pub fn new(from: u32, to: u32, convert: F) -> Self {
        Self {
            from,
            to,
            convert,
            _snapshot: PhantomData,
        }
    }
}

impl<S, F> VersionConverter<S> for FnConverter<S, F>
where
    F: Fn(S) -> S + Send + Sync,
{
    fn from_version(&self) -> u32 {
        self.from
    }

    fn to_version(&self) -> u32 {
        self.to
    }

    fn convert(&self, from: S) -> S {
        (self.convert)(from)
    }
}

/// Result of a successful [`ConverterChain::migrate`].
#[derive(Debug)]
pub struct Migration<S> {
    pub snapshot: S,
    pub from: u32,
    pub to: u32,
    pub steps: usize,
}

/// Converters for one save-model kind, keyed by source version.
pub struct ConverterChain<S> {
    converters: BTreeMap<u32, Box<dyn VersionConverter<S>>>,
}

impl<S: SaveModel> ConverterChain<S> {
    pub fn new() -> Self {
        Self {
            converters: BTreeMap::new(),
        }
    }

    /// Adds a converter.
    ///
    /// Rejects a second converter for the same source version and any
    /// converter that does not strictly increase the version.
    pub fn add(
        &mut self,
        converter: impl VersionConverter<S> + 'static,
    ) -> Result<&mut Self, MigrationError> {
        let from = converter.from_version();
        let to = converter.to_version();
        if to <= from {
            return Err(MigrationError::NonIncreasing { from, to });
        }
        if self.converters.contains_key(&from) {
            return Err(MigrationError::DuplicateConverter { from });
        }
        self.converters.insert(from, Box::new(converter));
        Ok(self)
    }

    /// Adds a closure converter from `from` to `to`.
    pub fn add_fn<F>(&mut self, from: u32, to: u32, convert: F) -> Result<&mut Self, MigrationError>
    where
        F: Fn(S) -> S + Send + Sync + 'static,
    {
        self.add(FnConverter::new(from, to, convert))
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Source versions with a registered converter, ascending.
    pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.converters.keys().copied()
    }

    /// Upgrades `snapshot` until its version reaches `target`.
    ///
    /// A snapshot already at or past `target` is returned untouched. Every
    /// step is stamped with the converter's `to_version`; a missing step is a
    /// [`MigrationError::Gap`].
    pub fn migrate(&self, snapshot: S, target: u32) -> Result<Migration<S>, MigrationError> {
        let from = snapshot.version();
        let mut current = from;
        let mut snapshot = snapshot;
        let mut steps = 0;

        while current < target {
            let converter = self
                .converters
                .get(&current)
                .ok_or(MigrationError::Gap {
                    from: current,
                    target,
                })?;

            let next = converter.to_version();
            snapshot = converter.convert(snapshot);
            snapshot.set_version(next);

            trace!(
                target: "save::migration",
                from = current,
                to = next,
                "Applied version converter"
            );

            current = next;
            steps += 1;
        }

        Ok(Migration {
            snapshot,
            from,
            to: current,
            steps,
        })
    }

    /// Checks that every version in `oldest..target` can reach `target`.
    pub fn validate(&self, oldest: u32, target: u32) -> Result<(), MigrationError> {
        for start in oldest..target {
            let mut current = start;
            while current < target {
                current = self
                    .converters
                    .get(&current)
                    .map(|converter| converter.to_version())
                    .ok_or(MigrationError::Gap {
                        from: current,
                        target,
                    })?;
            }
        }
        Ok(())
    }
}

impl<S: SaveModel> Default for ConverterChain<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SaveModel> std::fmt::Debug for ConverterChain<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterChain")
            .field("versions", &self.versions().collect::<Vec<_>>())
            .finish()
    }
}
