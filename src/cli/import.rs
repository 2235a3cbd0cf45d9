//! `kura import` command - bulk load items from JSONL
//!
//! Each line is one JSON object: `{"category": "...", "title": "...",
//! "body": "...", "embedding_ref": "..."}`. Optionally a precomputed
//! neighbor list: `"neighbors": [{"id": "...", "score": 0.93}]`.

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use ulid::Ulid;

use crate::config::Config;
use crate::core::item::Item;
use crate::core::storage::Storage;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSONL file to import
    pub file: PathBuf,

    /// Skip lines that fail to parse instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,
}

#[derive(Debug, Deserialize)]
struct ImportLine {
    category: String,
    title: String,
    body: String,
    #[serde(default)]
    id: Option<Ulid>,
    #[serde(default)]
    embedding_ref: Option<String>,
    #[serde(default)]
    neighbors: Vec<ImportNeighbor>,
}

#[derive(Debug, Deserialize)]
struct ImportNeighbor {
    id: Ulid,
    score: f64,
}

pub fn run(args: ImportArgs) -> Result<()> {
    let config = Config::load()?;
    let storage = Storage::open(&config.data_dir())?;

    let file = File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let reader = BufReader::new(file);

    let mut imported = 0usize;
    let mut skipped = 0usize;

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed: ImportLine = match serde_json::from_str(&line) {
            Ok(p) => p,
            Err(e) if args.skip_invalid => {
                eprintln!("⚠️  Line {}: {}", lineno + 1, e);
                skipped += 1;
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("line {} is not valid", lineno + 1))
            }
        };

        let mut item = Item::new(&parsed.category, parsed.title, parsed.body);
        if let Some(id) = parsed.id {
            item.id = id;
        }
        if let Some(handle) = parsed.embedding_ref {
            item = item.with_embedding_ref(handle);
        }

        storage.insert_item(&item)?;
        if !parsed.neighbors.is_empty() {
            let pairs: Vec<(Ulid, f64)> =
                parsed.neighbors.iter().map(|n| (n.id, n.score)).collect();
            storage.replace_neighbors(&item.id, &pairs)?;
        }
        imported += 1;
    }

    println!("✅ Imported {} item(s)", imported);
    if skipped > 0 {
        println!("⚠️  Skipped {} invalid line(s)", skipped);
    }

    Ok(())
}
