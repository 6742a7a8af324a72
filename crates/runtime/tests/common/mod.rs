//! Shared fixtures: a two-kind game with a versioned player model and a
//! flat settings model, plus a storage wrapper that fails on demand.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use save_runtime::storage;
use save_runtime::{
    AsyncStorageProvider, ConverterChain, DataModel, GameData, LoadStrategy, MemoryStorage,
    SaveModel, SaveStrategy, StorageError, StorageProvider, StrategyError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
pub enum Kind {
    Player,
    PlayerSave,
    Settings,
    SettingsSave,
}

// ============================================================================
// Player: three schema revisions
// ============================================================================

pub const PLAYER_VERSION: u32 = 2;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    pub gold: u64,
    pub level: u32,
}

impl DataModel for Player {
    fn version(&self) -> u32 {
        PLAYER_VERSION
    }
}

/// v0 stored gold in hundreds, v1 had no name.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSave {
    pub version: u32,
    pub name: String,
    pub gold: u64,
    pub level: u32,
}

impl SaveModel for PlayerSave {
    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }
}

/// Counters shared between a strategy and the test observing it.
#[derive(Debug, Default)]
pub struct Probe {
    pub first_loads: AtomicUsize,
    pub loads: AtomicUsize,
    pub conversions: Mutex<Vec<(u32, u32)>>,
    pub fail_save: AtomicBool,
}

impl Probe {
    pub fn first_loads(&self) -> usize {
        self.first_loads.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn conversions(&self) -> Vec<(u32, u32)> {
        self.conversions.lock().unwrap().clone()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }
}

pub struct PlayerStrategy {
    probe: Arc<Probe>,
    chain: ConverterChain<PlayerSave>,
}

impl PlayerStrategy {
    pub fn new(probe: Arc<Probe>) -> Self {
        let mut chain = ConverterChain::new();

        let p0 = Arc::clone(&probe);
        let p1 = Arc::clone(&probe);
        chain
            .add_fn(0, 1, move |mut save: PlayerSave| {
                p0.conversions.lock().unwrap().push((0, 1));
                save.gold *= 100;
                save
            })
            .unwrap()
            .add_fn(1, 2, move |mut save: PlayerSave| {
                p1.conversions.lock().unwrap().push((1, 2));
                if save.name.is_empty() {
                    save.name = "Wanderer".to_string();
                }
                save
            })
            .unwrap();

        Self { probe, chain }
    }
}

impl SaveStrategy for PlayerStrategy {
    type Save = PlayerSave;
    type Data = Player;

    fn save(&self, data: &Player) -> Result<PlayerSave, StrategyError> {
        if self.probe.fail_save.load(Ordering::SeqCst) {
            return Err(StrategyError::new("player snapshot refused"));
        }
        Ok(PlayerSave {
            version: 0,
            name: data.name.clone(),
            gold: data.gold,
            level: data.level,
        })
    }
}

impl LoadStrategy for PlayerStrategy {
    type Save = PlayerSave;
    type Data = Player;

    fn converters(&self) -> &ConverterChain<PlayerSave> {
        &self.chain
    }

    fn on_first_load(&self, data: &mut Player) {
        self.probe.first_loads.fetch_add(1, Ordering::SeqCst);
        data.name = "Newcomer".to_string();
        data.gold = 50;
        data.level = 1;
    }

    fn on_load(&self, snapshot: PlayerSave, data: &mut Player) {
        self.probe.loads.fetch_add(1, Ordering::SeqCst);
        data.name = snapshot.name;
        data.gold = snapshot.gold;
        data.level = snapshot.level;
    }
}

// ============================================================================
// Settings: single revision, no converters
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Settings {
    pub volume: u8,
    pub language: String,
}

impl DataModel for Settings {
    fn version(&self) -> u32 {
        1
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSave {
    pub version: u32,
    pub volume: u8,
    pub language: String,
}

impl SaveModel for SettingsSave {
    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }
}

#[derive(Default)]
pub struct SettingsStrategy {
    chain: ConverterChain<SettingsSave>,
}

impl SaveStrategy for SettingsStrategy {
    type Save = SettingsSave;
    type Data = Settings;

    fn save(&self, data: &Settings) -> Result<SettingsSave, StrategyError> {
        Ok(SettingsSave {
            version: 0,
            volume: data.volume,
            language: data.language.clone(),
        })
    }
}

impl LoadStrategy for SettingsStrategy {
    type Save = SettingsSave;
    type Data = Settings;

    fn converters(&self) -> &ConverterChain<SettingsSave> {
        &self.chain
    }

    fn on_first_load(&self, data: &mut Settings) {
        data.volume = 70;
        data.language = "en".to_string();
    }

    fn on_load(&self, snapshot: SettingsSave, data: &mut Settings) {
        data.volume = snapshot.volume;
        data.language = snapshot.language;
    }
}

// ============================================================================
// Registries
// ============================================================================

pub fn game_data(player: Player, settings: Settings) -> GameData<Kind> {
    let mut data = GameData::new();
    data.add(Kind::Player, player).unwrap();
    data.add(Kind::Settings, settings).unwrap();
    data
}

pub fn fresh_data() -> GameData<Kind> {
    game_data(Player::default(), Settings::default())
}

pub fn sample_player() -> Player {
    Player {
        name: "Ayla".to_string(),
        gold: 1_250,
        level: 7,
    }
}

pub fn sample_settings() -> Settings {
    Settings {
        volume: 35,
        language: "ko".to_string(),
    }
}

pub fn player(data: &GameData<Kind>) -> &Player {
    data.get_typed::<Player>(Kind::Player)
        .expect("player type")
        .expect("player registered")
}

pub fn settings(data: &GameData<Kind>) -> &Settings {
    data.get_typed::<Settings>(Kind::Settings)
        .expect("settings type")
        .expect("settings registered")
}

pub fn player_mut(data: &mut GameData<Kind>) -> &mut Player {
    data.get_typed_mut::<Player>(Kind::Player)
        .expect("player type")
        .expect("player registered")
}

// ============================================================================
// Storage that fails on demand
// ============================================================================

/// Memory storage whose writes to chosen names fail with an I/O error.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_save_to: Mutex<Option<String>>,
    fail_copy_to: Mutex<Option<String>>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_saves_to(&self, name: Option<&str>) {
        *self.fail_save_to.lock().unwrap() = name.map(str::to_string);
    }

    pub fn fail_copies_to(&self, name: Option<&str>) {
        *self.fail_copy_to.lock().unwrap() = name.map(str::to_string);
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.names().unwrap()
    }

    fn check(slot: &Mutex<Option<String>>, name: &str) -> storage::Result<()> {
        if slot.lock().unwrap().as_deref() == Some(name) {
            return Err(StorageError::Io(std::io::Error::other(format!(
                "injected failure writing {name}"
            ))));
        }
        Ok(())
    }
}

impl StorageProvider for FlakyStorage {
    fn exists(&self, name: &str) -> bool {
        StorageProvider::exists(&self.inner, name)
    }

    fn load(&self, name: &str) -> storage::Result<Vec<u8>> {
        StorageProvider::load(&self.inner, name)
    }

    fn save(&self, name: &str, bytes: &[u8]) -> storage::Result<()> {
        Self::check(&self.fail_save_to, name)?;
        StorageProvider::save(&self.inner, name, bytes)
    }

    fn delete(&self, name: &str) -> storage::Result<()> {
        StorageProvider::delete(&self.inner, name)
    }

    fn copy(&self, src: &str, dst: &str) -> storage::Result<()> {
        Self::check(&self.fail_copy_to, dst)?;
        StorageProvider::copy(&self.inner, src, dst)
    }
}

#[async_trait]
impl AsyncStorageProvider for FlakyStorage {
    async fn exists(&self, name: &str) -> bool {
        StorageProvider::exists(self, name)
    }

    async fn load(&self, name: &str) -> storage::Result<Vec<u8>> {
        StorageProvider::load(self, name)
    }

    async fn save(&self, name: &str, bytes: &[u8]) -> storage::Result<()> {
        StorageProvider::save(self, name, bytes)
    }

    async fn delete(&self, name: &str) -> storage::Result<()> {
        StorageProvider::delete(self, name)
    }

    async fn copy(&self, src: &str, dst: &str) -> storage::Result<()> {
        StorageProvider::copy(self, src, dst)
    }
}
