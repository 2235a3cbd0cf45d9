//! `kura report` command - knowledge base and curation snapshot

use anyhow::Result;
use clap::Args;

use crate::config::Config;
use crate::core::report::CurationReport;
use crate::core::storage::Storage;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ReportArgs) -> Result<()> {
    let config = Config::load()?;
    let storage = Storage::open(&config.data_dir())?;

    let report = CurationReport::gather(&storage, None)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}
