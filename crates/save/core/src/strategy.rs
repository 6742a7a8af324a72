//! Save and load strategies.
//!
//! A [`SaveStrategy`] turns a live model into a snapshot. A [`LoadStrategy`]
//! goes the other way: on a fresh install it initializes the live model with
//! defaults, otherwise it migrates the stored snapshot through its
//! [`ConverterChain`] and applies it.
//!
//! Both traits are typed on one save model and one data model. Binding tables
//! pick the strategy by kind, so the wrong snapshot never reaches a strategy.

use std::sync::Arc;

use thiserror::Error;

use crate::converter::{ConverterChain, MigrationError};
use crate::model::{DataModel, SaveModel};

/// Failure reported by a [`SaveStrategy`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StrategyError {
    message: String,
}

impl StrategyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Maps a live data model to its snapshot. Must not perform I/O.
pub trait SaveStrategy: Send + Sync + 'static {
    type Save: SaveModel;
    type Data: DataModel;

    fn save(&self, data: &Self::Data) -> Result<Self::Save, StrategyError>;
}

/// How a [`LoadStrategy::load`] call reached the live model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No stored snapshot; the model was initialized with defaults.
    FirstLoad,
    /// Snapshot was already at the live version.
    Current { version: u32 },
    /// Snapshot was upgraded through the converter chain.
    Migrated { from: u32, to: u32, steps: usize },
    /// Snapshot was written by newer code and applied as-is.
    Ahead { stored: u32, current: u32 },
}

/// Applies snapshots onto a live data model.
pub trait LoadStrategy: Send + Sync + 'static {
    type Save: SaveModel;
    type Data: DataModel;

    /// Upgrade steps for older snapshots.
    fn converters(&self) -> &ConverterChain<Self::Save>;

    /// Populates `data` for a fresh install.
    fn on_first_load(&self, data: &mut Self::Data);

    /// Copies an up-to-date snapshot onto `data`.
    fn on_load(&self, snapshot: Self::Save, data: &mut Self::Data);

    /// Runs the first-load or migrate-and-apply path.
    ///
    /// A snapshot newer than the live model is applied without migration;
    /// there is no downgrade path.
    fn load(
        &self,
        snapshot: Self::Save,
        data: &mut Self::Data,
        first_load: bool,
    ) -> Result<LoadOutcome, MigrationError> {
        if first_load {
            self.on_first_load(data);
            return Ok(LoadOutcome::FirstLoad);
        }

        let stored = snapshot.version();
        let current = data.version();

        if stored > current {
            self.on_load(snapshot, data);
            return Ok(LoadOutcome::Ahead { stored, current });
        }

        if stored == current {
            self.on_load(snapshot, data);
            return Ok(LoadOutcome::Current { version: current });
        }

        let migration = self.converters().migrate(snapshot, current)?;
        let outcome = LoadOutcome::Migrated {
            from: migration.from,
            to: migration.to,
            steps: migration.steps,
        };
        self.on_load(migration.snapshot, data);
        Ok(outcome)
    }
}

// Shared strategies: one value can back both a saver and a loader binding.

impl<T: SaveStrategy> SaveStrategy for Arc<T> {
    type Save = T::Save;
    type Data = T::Data;

    fn save(&self, data: &Self::Data) -> Result<Self::Save, StrategyError> {
        T::save(self, data)
    }
}

impl<T: LoadStrategy> LoadStrategy for Arc<T> {
    type Save = T::Save;
    type Data = T::Data;

    fn converters(&self) -> &ConverterChain<Self::Save> {
        T::converters(self)
    }

    fn on_first_load(&self, data: &mut Self::Data) {
        T::on_first_load(self, data);
    }

    fn on_load(&self, snapshot: Self::Save, data: &mut Self::Data) {
        T::on_load(self, snapshot, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Hero {
        level: u32,
        title: String,
    }

    impl DataModel for Hero {
        fn version(&self) -> u32 {
            2
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct HeroSave {
        version: u32,
        level: u32,
        title: String,
    }

    impl SaveModel for HeroSave {
        fn version(&self) -> u32 {
            self.version
        }

        fn set_version(&mut self, version: u32) {
            self.version = version;
        }
    }

    struct HeroStrategy {
        chain: ConverterChain<HeroSave>,
        first_loads: AtomicUsize,
    }

    impl HeroStrategy {
        fn new() -> Self {
            let mut chain = ConverterChain::new();
            chain
                .add_fn(0, 1, |mut save: HeroSave| {
                    save.level *= 10;
                    save
                })
                .unwrap()
                .add_fn(1, 2, |mut save: HeroSave| {
                    save.title = format!("Sir {}", save.title);
                    save
                })
                .unwrap();
            Self {
                chain,
                first_loads: AtomicUsize::new(0),
            }
        }
    }

    impl SaveStrategy for HeroStrategy {
        type Save = HeroSave;
        type Data = Hero;

        fn save(&self, data: &Hero) -> Result<HeroSave, StrategyError> {
            if data.title.is_empty() {
                return Err(StrategyError::new("hero has no title"));
            }
            Ok(HeroSave {
                version: 0,
                level: data.level,
                title: data.title.clone(),
            })
        }
    }

    impl LoadStrategy for HeroStrategy {
        type Save = HeroSave;
        type Data = Hero;

        fn converters(&self) -> &ConverterChain<HeroSave> {
            &self.chain
        }

        fn on_first_load(&self, data: &mut Hero) {
            self.first_loads.fetch_add(1, Ordering::SeqCst);
            data.level = 1;
            data.title = "Novice".to_string();
        }

        fn on_load(&self, snapshot: HeroSave, data: &mut Hero) {
            data.level = snapshot.level;
            data.title = snapshot.title;
        }
    }

    #[test]
    fn test_first_load_initializes_defaults() {
        let strategy = HeroStrategy::new();
        let mut hero = Hero::default();

        let outcome = strategy
            .load(
                HeroSave {
                    version: 0,
                    level: 99,
                    title: "ignored".to_string(),
                },
                &mut hero,
                true,
            )
            .unwrap();

        assert_eq!(outcome, LoadOutcome::FirstLoad);
        assert_eq!(hero.level, 1);
        assert_eq!(hero.title, "Novice");
        assert_eq!(strategy.first_loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_migration_runs_each_step_once() {
        let strategy = HeroStrategy::new();
        let mut hero = Hero::default();

        let outcome = strategy
            .load(
                HeroSave {
                    version: 0,
                    level: 3,
                    title: "Bob".to_string(),
                },
                &mut hero,
                false,
            )
            .unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Migrated {
                from: 0,
                to: 2,
                steps: 2
            }
        );
        assert_eq!(hero.level, 30);
        assert_eq!(hero.title, "Sir Bob");
        assert_eq!(strategy.first_loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_newer_snapshot_applied_as_is() {
        let strategy = HeroStrategy::new();
        let mut hero = Hero::default();

        let outcome = strategy
            .load(
                HeroSave {
                    version: 7,
                    level: 5,
                    title: "Future".to_string(),
                },
                &mut hero,
                false,
            )
            .unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Ahead {
                stored: 7,
                current: 2
            }
        );
        assert_eq!(hero.level, 5);
        assert_eq!(hero.title, "Future");
    }

    #[test]
    fn test_broken_chain_leaves_model_untouched() {
        let strategy = HeroStrategy {
            chain: ConverterChain::new(),
            first_loads: AtomicUsize::new(0),
        };
        let mut hero = Hero {
            level: 4,
            title: "Kept".to_string(),
        };

        let err = strategy
            .load(
                HeroSave {
                    version: 1,
                    level: 0,
                    title: String::new(),
                },
                &mut hero,
                false,
            )
            .unwrap_err();

        assert_eq!(err, MigrationError::Gap { from: 1, target: 2 });
        assert_eq!(hero.level, 4);
        assert_eq!(hero.title, "Kept");
    }

    #[test]
    fn test_save_strategy_error() {
        let strategy = HeroStrategy::new();
        let err = SaveStrategy::save(&strategy, &Hero::default()).unwrap_err();
        assert_eq!(err.message(), "hero has no title");
    }

    #[test]
    fn test_shared_strategy_backs_both_directions() {
        let shared = Arc::new(HeroStrategy::new());
        let hero = Hero {
            level: 2,
            title: "Ann".to_string(),
        };

        let mut snapshot = SaveStrategy::save(&shared, &hero).unwrap();
        snapshot.set_version(2);

        let mut restored = Hero::default();
        let outcome = LoadStrategy::load(&shared, snapshot, &mut restored, false).unwrap();

        assert_eq!(outcome, LoadOutcome::Current { version: 2 });
        assert_eq!(restored.title, "Ann");
        assert_eq!(shared.first_loads.load(Ordering::SeqCst), 0);
    }
}
