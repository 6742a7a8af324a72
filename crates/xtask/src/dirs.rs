//! Save directory discovery and listing
//!
//! A save directory holds one file per save-model kind plus, while a save is
//! in flight (or after a crash in the middle of one), a backup next to it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use save_runtime::PersistenceConfig;

/// One entry of a save directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    /// Primary name this backup belongs to, if it is a backup.
    pub backup_of: Option<String>,
}

impl SaveFile {
    pub fn is_backup(&self) -> bool {
        self.backup_of.is_some()
    }
}

/// Save directory to operate on: explicit override, else configuration.
pub fn save_dir(config: &PersistenceConfig, dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| config.save_dir.clone())
}

/// List regular files in `dir`, sorted by name.
///
/// Half-written `*.tmp` files are listed as well so `clean` can remove them;
/// a missing directory lists as empty.
pub fn list_files(dir: &Path, backup_suffix: &str) -> Result<Vec<SaveFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read save directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file()
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
        {
            let backup_of = name
                .strip_suffix(backup_suffix)
                .filter(|primary| !primary.is_empty() && !backup_suffix.is_empty())
                .map(str::to_string);

            files.push(SaveFile {
                name: name.to_string(),
                size: entry.metadata()?.len(),
                path: path.clone(),
                backup_of,
            });
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(files)
}

pub fn is_temp(name: &str) -> bool {
    name.ends_with(".tmp")
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
