//! `kura add` command
//!
//! # Usage
//! ```bash
//! kura add --category skills "Retry with exponential backoff"
//! kura add --category recipes --title "Pour-over" --file recipe.md
//! ```

use anyhow::Result;
use clap::Args;
use std::fs;

use crate::config::Config;
use crate::core::item::Item;
use crate::core::storage::Storage;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Category the item belongs to (e.g. skills, recipes)
    #[arg(long)]
    pub category: String,

    /// Content of the item
    pub content: Option<String>,

    /// Title (first line of content if not provided)
    #[arg(long)]
    pub title: Option<String>,

    /// Read content from file
    #[arg(short = 'f', long)]
    pub file: Option<String>,

    /// Embedding handle assigned by the external pipeline
    #[arg(long)]
    pub embedding_ref: Option<String>,
}

pub fn run(args: AddArgs) -> Result<()> {
    let config = Config::load()?;
    let storage = Storage::open(&config.data_dir())?;

    let content = match (&args.file, &args.content) {
        (Some(path), _) => fs::read_to_string(path)?,
        (None, Some(content)) => content.clone(),
        (None, None) => anyhow::bail!("Content is required. Pass it directly or use --file."),
    };

    let title = args.title.clone().unwrap_or_else(|| {
        content
            .lines()
            .next()
            .unwrap_or(&content)
            .chars()
            .take(50)
            .collect()
    });

    let mut item = Item::new(&args.category, title, content);
    if let Some(handle) = args.embedding_ref {
        item = item.with_embedding_ref(handle);
    }

    storage.insert_item(&item)?;

    println!("✅ Added {} [{}] {}", item.kura_id(), item.category, item.title);

    Ok(())
}
