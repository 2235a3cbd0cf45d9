//! `kura init` command
//!
//! # Usage
//! ```bash
//! kura init                    # Initialize in current directory
//! kura init /path/to/project   # Initialize in specific path
//! kura init --global           # Initialize global ~/.kura
//! ```

use anyhow::{bail, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::core::storage::Storage;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to initialize (default: current directory)
    pub path: Option<PathBuf>,

    /// Initialize global config (~/.kura)
    #[arg(long)]
    pub global: bool,

    /// Force re-initialization
    #[arg(short, long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let base_path = if args.global {
        Config::global_config_path()
            .and_then(|p| p.parent().and_then(|p| p.parent()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        args.path.unwrap_or_else(|| PathBuf::from("."))
    };

    let kura_dir = base_path.join(".kura");

    if kura_dir.join("config.toml").exists() && !args.force {
        bail!(
            "Directory {} is already a kura repository. Use --force to reinitialize.",
            base_path.display()
        );
    }

    println!("🚀 Initializing kura in: {}", base_path.display());

    fs::create_dir_all(&kura_dir)?;

    let config = Config::default();
    let config_path = kura_dir.join("config.toml");
    config.save_to(&config_path)?;

    let db_path = kura_dir.join("data.db");
    let _storage = Storage::open(&db_path)?;

    println!("\n✅ Initialized kura repository");
    println!("  Config:   {}", config_path.display());
    println!("  Database: {}", db_path.display());

    Ok(())
}
