//! CLI module - Command definitions and handlers

use clap::{Parser, Subcommand};

pub mod add;
pub mod curate;
pub mod import;
pub mod init;
pub mod report;
pub mod review;
pub mod show;
pub mod stats;
pub mod triads;

/// kura - knowledge base deduplication and curation
///
/// Builds a similarity graph over knowledge items, merges near-identical
/// entries, and routes ambiguous groups to human or LLM review.
#[derive(Parser, Debug)]
#[command(name = "kura")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "KURA_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new kura repository
    Init(init::InitArgs),

    /// Add a knowledge item
    Add(add::AddArgs),

    /// Import items from a JSONL file
    Import(import::ImportArgs),

    /// Show an item and its decision lineage
    Show(show::ShowArgs),

    /// Show database statistics
    Stats(stats::StatsArgs),

    /// List drift triads awaiting review
    Triads(triads::TriadsArgs),

    /// Interactively review duplicate candidates
    Review(review::ReviewArgs),

    /// Run the automated curation loop
    Curate(curate::CurateArgs),

    /// Produce a curation report
    Report(report::ReportArgs),
}
