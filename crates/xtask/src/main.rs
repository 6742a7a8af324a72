//! Development tasks for save directories
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, Inspect, Restore};
use save_runtime::PersistenceConfig;

/// Development tasks for save directories
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for save data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// List save files and backups with their stored versions
    Inspect(Inspect),

    /// Clean backups or the whole save directory
    Clean(Clean),

    /// Restore a save file from its backup
    Restore(Restore),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for SAVE_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = PersistenceConfig::from_env();
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect(cmd) => cmd.execute(&config),
        Command::Clean(cmd) => cmd.execute(&config),
        Command::Restore(cmd) => cmd.execute(&config),
    }
}
