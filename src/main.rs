//! kura CLI - Entry point
//!
//! Usage: kura <command> [options]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kura::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => kura::cli::init::run(args),
        Commands::Add(args) => kura::cli::add::run(args),
        Commands::Import(args) => kura::cli::import::run(args),
        Commands::Show(args) => kura::cli::show::run(args),
        Commands::Stats(args) => kura::cli::stats::run(args),
        Commands::Triads(args) => kura::cli::triads::run(args),
        Commands::Review(args) => kura::cli::review::run(args),
        Commands::Curate(args) => kura::cli::curate::run(args),
        Commands::Report(args) => kura::cli::report::run(args),
    }
}
