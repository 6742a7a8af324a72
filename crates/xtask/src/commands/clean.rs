//! Clean save data command
//!
//! Removes either the leftovers of interrupted saves (backups and temp files)
//! or the whole save directory.
//!
//! Safety: Always prompts for confirmation before deletion.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;

use save_runtime::PersistenceConfig;

use crate::dirs;

/// Clean backups or the whole save directory
#[derive(Parser, Debug)]
pub struct Clean {
    /// Clean only backups and temp files, keeping save files
    #[arg(long)]
    pub backups: bool,

    /// Custom save directory (defaults to SAVE_DATA_DIR or the platform data dir)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Skip confirmation prompt (dangerous!)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl Clean {
    pub fn execute(self, config: &PersistenceConfig) -> Result<()> {
        let dir = dirs::save_dir(config, self.dir.clone());

        if !dir.exists() {
            println!(
                "{}",
                style("Nothing to clean - save directory doesn't exist yet").dim()
            );
            return Ok(());
        }

        let targets: Vec<(String, PathBuf)> = if self.backups {
            dirs::list_files(&dir, &config.backup_suffix)?
                .into_iter()
                .filter(|f| f.is_backup() || dirs::is_temp(&f.name))
                .map(|f| (f.name, f.path))
                .collect()
        } else {
            vec![("Save data".to_string(), dir.clone())]
        };

        if targets.is_empty() {
            println!("{}", style("Nothing to clean - no backups found").dim());
            return Ok(());
        }

        println!("{}", style("Clean Save Data").yellow().bold());
        println!();
        println!("The following will be deleted:");
        for (label, path) in &targets {
            println!("  {} {}", style("->").cyan(), style(label).bold());
            println!("    {}", style(path.display()).dim());
        }
        println!();

        if !self.yes && !self.confirm()? {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }

        for (label, path) in targets {
            print!("Deleting {}... ", label);
            io::stdout().flush()?;

            let removed = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            removed.with_context(|| format!("Failed to delete: {}", path.display()))?;

            println!("{}", style("ok").green());
        }

        println!();
        println!("{}", style("Cleanup complete!").green().bold());

        Ok(())
    }

    /// Prompt user for confirmation
    fn confirm(&self) -> Result<bool> {
        print!("{} ", style("Proceed? [y/N]").yellow().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }
}
