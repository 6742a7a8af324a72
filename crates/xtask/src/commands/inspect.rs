//! Inspect a save directory
//!
//! Lists every save file and backup with its size. For self-describing
//! formats each file is decoded through the configured codec (transforms
//! included) and its stored `version` is shown.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde_json::Value;
use std::path::PathBuf;

use save_runtime::{Codec, PersistenceConfig};

use crate::dirs::{self, SaveFile};

/// List save files and backups with their stored versions
#[derive(Parser, Debug)]
pub struct Inspect {
    /// Custom save directory (defaults to SAVE_DATA_DIR or the platform data dir)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Print the decoded document of this file
    #[arg(short, long, value_name = "NAME")]
    show: Option<String>,
}

impl Inspect {
    pub fn execute(self, config: &PersistenceConfig) -> Result<()> {
        let dir = dirs::save_dir(config, self.dir);
        let files = dirs::list_files(&dir, &config.backup_suffix)?;
        let codec = config.codec();

        println!("{} {}", style("Save Directory:").bold().cyan(), dir.display());
        println!("{} {}", style("Format:").bold().cyan(), codec.format());
        println!();

        if files.is_empty() {
            println!("{}", style("No save files found").dim());
            return Ok(());
        }

        for file in &files {
            print_entry(file, &files, &codec);
        }

        if let Some(name) = &self.show {
            let file = files
                .iter()
                .find(|f| &f.name == name)
                .with_context(|| format!("Save file not found: {}", name))?;
            let document = decode(file, &codec)?;

            println!();
            println!("{}", style(format!("=== {} ===", file.name)).bold().green());
            println!("{}", serde_json::to_string_pretty(&document)?);
        }

        Ok(())
    }
}

fn print_entry(file: &SaveFile, files: &[SaveFile], codec: &Codec) {
    let label = if dirs::is_temp(&file.name) {
        style("temp").red()
    } else if let Some(primary) = &file.backup_of {
        if files.iter().any(|f| &f.name == primary) {
            style("backup").yellow()
        } else {
            style("orphan backup").red().bold()
        }
    } else {
        style("save").green()
    };

    let version = if !codec.format().is_self_describing() {
        style("-".to_string()).dim()
    } else {
        match decode(file, codec) {
            Ok(document) => match document.get("version").and_then(Value::as_u64) {
                Some(version) => style(format!("v{}", version)),
                None => style("no version".to_string()).dim(),
            },
            Err(_) => style("unreadable".to_string()).red(),
        }
    };

    println!(
        "  {:<14} {:<32} {:>12}  {}",
        label,
        style(&file.name).bold(),
        dirs::format_bytes(file.size),
        version
    );
}

fn decode(file: &SaveFile, codec: &Codec) -> Result<Value> {
    let bytes = std::fs::read(&file.path)
        .with_context(|| format!("Failed to read save file: {}", file.path.display()))?;

    codec
        .decode::<Value>(bytes)
        .with_context(|| format!("Failed to decode save file: {}", file.path.display()))
}
