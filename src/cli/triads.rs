//! `kura triads` command - list drift triads
//!
//! Triads are flagged only, never auto-resolved. This command rebuilds
//! the graph from stored neighbors and prints what a reviewer should
//! look at.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::Config;
use crate::core::graph::GraphBuilder;
use crate::core::storage::{Storage, StoredVectorProvider};
use crate::core::triad::detect_triads;

#[derive(Args, Debug)]
pub struct TriadsArgs {
    /// Restrict to one category
    #[arg(long)]
    pub category: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TriadsArgs) -> Result<()> {
    let config = Config::load()?;
    let storage = Storage::open(&config.data_dir())?;
    let provider = StoredVectorProvider::new(&storage)?;
    let mut builder = GraphBuilder::new(&provider, None, &config);

    let categories = match args.category {
        Some(c) => vec![c],
        None => storage.categories()?,
    };

    let mut all = Vec::new();
    for category in &categories {
        let items = storage.active_items(category)?;
        if items.len() < 3 {
            continue;
        }
        let graph = builder.build(category, &items)?;
        for triad in detect_triads(&graph, config.thresholds.high_bucket) {
            all.push((category.clone(), triad));
        }
    }

    if args.json {
        let payload: Vec<_> = all
            .iter()
            .map(|(category, t)| {
                serde_json::json!({
                    "category": category,
                    "members": t.members,
                    "pivot": t.pivot,
                    "close_score": t.close_score,
                    "other_score": t.other_score,
                    "distant_score": t.distant_score,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if all.is_empty() {
        println!("✅ No drift triads found");
        return Ok(());
    }

    println!("⚠️  {} drift triad(s) need a human look:\n", all.len());
    for (category, t) in &all {
        println!("  [{}] pivot {}", category, t.pivot.to_string().bold());
        println!(
            "    {} ↔ {}  {:.2}",
            t.close_pair.0, t.close_pair.1, t.close_score
        );
        println!(
            "    {} ↔ {}  {:.2}",
            t.other_pair.0, t.other_pair.1, t.other_score
        );
        println!(
            "    {} ↔ {}  {:.2}  ← outlier",
            t.distant_pair.0, t.distant_pair.1, t.distant_score
        );
        println!();
    }

    Ok(())
}
