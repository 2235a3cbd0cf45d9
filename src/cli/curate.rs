//! `kura curate` command - run the automated curation loop

use anyhow::Result;
use clap::Args;

use crate::config::Config;
use crate::core::convergence::{CurationLoop, HaltReason};
use crate::core::report::CurationReport;
use crate::core::storage::{Storage, StoredVectorProvider};

#[derive(Args, Debug)]
pub struct CurateArgs {
    /// Restrict to one category
    #[arg(long)]
    pub category: Option<String>,

    /// Compute everything but persist nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Override the configured round cap
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// Print the full report as JSON when done
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CurateArgs) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(max) = args.max_rounds {
        config.convergence.max_iterations = max;
        config.validate()?;
    }

    let storage = Storage::open(&config.data_dir())?;
    let provider = StoredVectorProvider::new(&storage)?;

    let categories: Vec<String> = args.category.clone().into_iter().collect();

    if args.dry_run {
        println!("🔍 Dry run: no decisions will be recorded\n");
    }

    let mut cloop = CurationLoop::new(&storage, &provider, None, None, &config, args.dry_run);
    let outcome = cloop.run(&categories)?;

    if args.json {
        let report = CurationReport::gather(&storage, Some(&outcome))?;
        println!("{}", report.to_json()?);
        return Ok(());
    }

    for r in &outcome.rounds {
        println!(
            "  Round {}: {} → {} items, {} merged, {} deferred",
            r.round, r.items_before, r.items_after, r.merges, r.deferred_to_manual
        );
    }

    match outcome.halt {
        HaltReason::Converged => println!("\n✅ Converged"),
        HaltReason::MaxIterations => println!("\n⏸  Stopped at round cap"),
        HaltReason::Exhausted => println!("\n✅ Nothing left to process"),
    }

    let pending = storage.count_manual_review()?;
    if pending > 0 {
        println!("👀 {} group(s) await manual review (kura report)", pending);
    }

    Ok(())
}
