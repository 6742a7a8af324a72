//! Restore a save file from its backup
//!
//! A backup only survives when a save was interrupted between taking it and
//! committing. This copies it back over the primary file and removes it, the
//! same steps the saver performs on rollback.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use save_runtime::{FileStorage, PersistenceConfig, StorageProvider};

use crate::dirs;

/// Restore a save file from its backup
#[derive(Parser, Debug)]
pub struct Restore {
    /// Save file to restore (e.g., PlayerSave)
    #[arg(value_name = "NAME")]
    name: String,

    /// Custom save directory (defaults to SAVE_DATA_DIR or the platform data dir)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

impl Restore {
    pub fn execute(self, config: &PersistenceConfig) -> Result<()> {
        let dir = dirs::save_dir(config, self.dir);
        if !dir.exists() {
            anyhow::bail!("Save directory not found: {}", dir.display());
        }

        restore(&dir, &self.name, &config.backup_suffix)?;

        println!(
            "{} Restored {} from backup",
            style("ok").green().bold(),
            style(&self.name).cyan()
        );

        Ok(())
    }
}

fn restore(dir: &std::path::Path, name: &str, suffix: &str) -> Result<()> {
    let storage = FileStorage::new(dir)
        .with_context(|| format!("Failed to open save directory: {}", dir.display()))?;
    let backup = format!("{}{}", name, suffix);

    if !StorageProvider::exists(&storage, &backup) {
        anyhow::bail!(
            "No backup for {} in {}\n\nHint: run `cargo xtask inspect` to list backups",
            name,
            dir.display()
        );
    }

    StorageProvider::copy(&storage, &backup, name)
        .with_context(|| format!("Failed to copy {} over {}", backup, name))?;
    StorageProvider::delete(&storage, &backup)
        .with_context(|| format!("Failed to delete {}", backup))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_restore_replaces_primary() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("PlayerSave"), b"broken").unwrap();
        std::fs::write(temp.path().join("PlayerSave-backup"), b"good").unwrap();

        restore(temp.path(), "PlayerSave", "-backup").unwrap();

        assert_eq!(std::fs::read(temp.path().join("PlayerSave")).unwrap(), b"good");
        assert!(!temp.path().join("PlayerSave-backup").exists());
    }

    #[test]
    fn test_restore_without_backup_fails() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("PlayerSave"), b"kept").unwrap();

        assert!(restore(temp.path(), "PlayerSave", "-backup").is_err());
        assert_eq!(std::fs::read(temp.path().join("PlayerSave")).unwrap(), b"kept");
    }
}
