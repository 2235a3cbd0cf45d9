//! `kura show` command - one item plus its decision lineage

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use ulid::Ulid;

use crate::config::Config;
use crate::core::storage::Storage;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Item id (full ULID or kura-xxxxxxxx short form)
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let config = Config::load()?;
    let storage = Storage::open(&config.data_dir())?;

    let id = resolve_id(&storage, &args.id)?;
    let Some(item) = storage.get_item(&id)? else {
        bail!("No item found with id {}", args.id);
    };

    let decisions = storage.decisions_touching(&id)?;

    if args.json {
        let payload = serde_json::json!({
            "item": item,
            "decisions": decisions,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "{} [{}] {}",
        item.kura_id().bold(),
        item.category,
        item.title
    );
    println!("  Status:   {}", item.status);
    if let Some(canonical) = item.canonical_of {
        println!("  Merged into: {}", canonical);
    }
    if let Some(ref handle) = item.embedding_ref {
        println!("  Embedding: {}", handle);
    }
    println!("  Created:  {}", item.created_at.to_rfc3339());
    println!("  Updated:  {}", item.updated_at.to_rfc3339());
    println!("\n{}", item.body);

    if !decisions.is_empty() {
        println!("\n📜 Decision lineage:");
        for d in &decisions {
            let rationale = d.rationale.as_deref().unwrap_or("-");
            println!(
                "  {} {} by {} ({} item(s)): {}",
                d.created_at.format("%Y-%m-%d %H:%M"),
                d.action.to_string().bold(),
                d.actor,
                d.subject.len(),
                rationale
            );
        }
    }

    Ok(())
}

/// Accept a full ULID or the kura-xxxxxxxx short prefix form
fn resolve_id(storage: &Storage, raw: &str) -> Result<Ulid> {
    if let Ok(id) = raw.parse::<Ulid>() {
        return Ok(id);
    }

    let prefix = raw.strip_prefix("kura-").unwrap_or(raw).to_lowercase();
    let mut matches = Vec::new();
    for category in storage.categories()? {
        for item in storage.active_items(&category)? {
            if item
                .id
                .to_string()
                .to_lowercase()
                .starts_with(&prefix)
            {
                matches.push(item.id);
            }
        }
    }

    match matches.len() {
        0 => bail!("No item matches '{}'", raw),
        1 => Ok(matches[0]),
        n => bail!("'{}' is ambiguous ({} matches); use the full id", raw, n),
    }
}
