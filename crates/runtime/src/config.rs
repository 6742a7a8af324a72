//! Persistence configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use crate::codec::{Checksum, Codec, SnapshotFormat, XorMask};
use crate::saver::DEFAULT_BACKUP_SUFFIX;
use crate::storage::{self, FileStorage};

/// Where and how snapshots are persisted.
#[derive(Clone, Debug)]
pub struct PersistenceConfig {
    pub save_dir: PathBuf,
    pub format: SnapshotFormat,
    pub checksum: bool,
    pub obfuscation_key: Option<String>,
    pub backup_suffix: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            format: SnapshotFormat::default(),
            checksum: false,
            obfuscation_key: None,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

impl PersistenceConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SAVE_DATA_DIR` - Directory for save files (default: platform-specific)
    /// - `SAVE_FORMAT` - `json`, `bincode` or `ron` (default: json)
    /// - `SAVE_CHECKSUM` - Append a SHA-256 checksum to every file (default: false)
    /// - `SAVE_OBFUSCATION_KEY` - XOR key applied to every file (default: none)
    /// - `SAVE_BACKUP_SUFFIX` - Suffix of backup files (default: `-backup`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = read("SAVE_DATA_DIR") {
            config.save_dir = PathBuf::from(dir);
        }

        if let Some(format) = parse(read("SAVE_FORMAT")) {
            config.format = format;
        }

        if let Some(enable) = parse::<bool>(read("SAVE_CHECKSUM")) {
            config.checksum = enable;
        } else if lookup("SAVE_CHECKSUM").is_some() {
            // Also accept just setting the variable without value as "true"
            config.checksum = true;
        }

        config.obfuscation_key = read("SAVE_OBFUSCATION_KEY");

        if let Some(suffix) = read("SAVE_BACKUP_SUFFIX") {
            config.backup_suffix = suffix;
        }

        config
    }

    /// Codec for the configured format and transforms.
    ///
    /// Obfuscation runs before the checksum, so the checksum covers the bytes
    /// that actually hit storage.
    pub fn codec(&self) -> Codec {
        let mut codec = Codec::new(self.format);
        if let Some(key) = &self.obfuscation_key {
            codec = codec.with_transform(XorMask::new(key.as_bytes()));
        }
        if self.checksum {
            codec = codec.with_transform(Checksum);
        }
        codec
    }

    /// Opens file storage at `save_dir`, creating the directory if needed.
    pub fn file_storage(&self) -> storage::Result<FileStorage> {
        FileStorage::new(&self.save_dir)
    }
}

/// Platform data directory for save files.
///
/// - macOS: `~/Library/Application Support/save-system`
/// - Linux: `~/.local/share/save-system` (or `$XDG_DATA_HOME/save-system`)
/// - Windows: `%APPDATA%\save-system`
/// - Fallback: `./save_data`
pub fn default_save_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "save-system")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

fn parse<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value?.trim().parse().ok()
}
