//! Stats command - Show database statistics

use clap::Args;

use crate::config::Config;
use crate::core::storage::Storage;

/// Stats command arguments
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute stats command
pub fn run(args: StatsArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let db_path = config.data_dir();
    let storage = Storage::open(&db_path)?;

    let stats = storage.stats()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("📊 Knowledge Base Statistics\n");
        println!("  Total items:      {}", stats.total_items);
        println!(
            "  ├── Pending:      {} ({}%)",
            stats.pending_items,
            pct(stats.pending_items, stats.total_items)
        );
        println!(
            "  ├── Synced:       {} ({}%)",
            stats.synced_items,
            pct(stats.synced_items, stats.total_items)
        );
        println!(
            "  └── Rejected:     {} ({}%)",
            stats.rejected_items,
            pct(stats.rejected_items, stats.total_items)
        );
        println!("  Decisions:        {}", stats.decision_count);
        println!("  Manual review:    {}", stats.manual_review_count);

        let categories = storage.category_breakdown()?;
        if !categories.is_empty() {
            println!("\n📂 Categories:");
            for c in &categories {
                println!(
                    "  {} ({} active, {} rejected)",
                    c.category, c.active, c.rejected
                );
            }
        }

        println!("\n📁 Database: {}", db_path.display());
    }

    Ok(())
}

fn pct(part: usize, total: usize) -> usize {
    if total > 0 {
        part * 100 / total
    } else {
        0
    }
}
