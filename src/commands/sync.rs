use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use skilla::{DesiredLinks, Linker, Materializer, Settings, load_source};

use super::{fail_on_errors, report};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Skill source (repeatable; git host path, browser URL, or local directory)
    #[arg(long = "source", required = true)]
    pub sources: Vec<String>,

    /// Destination directory for skill symlinks
    #[arg(long)]
    pub destination: PathBuf,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry: bool,

    /// Output machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Make the destination match the combined skills of all sources: add
/// missing links, fix changed ones and remove links no source produces.
///
/// Every source is loaded before the destination is touched, so a source
/// that fails to resolve or clone aborts the run without changes.
pub fn run_sync(args: SyncArgs, settings: &Settings, materializer: &dyn Materializer) -> Result<()> {
    let mut desired = DesiredLinks::new();

    for source in &args.sources {
        let loaded = load_source(source, None, settings, materializer)?;
        desired.add_source(&loaded)?;

        if !args.json {
            println!(
                "found {} skill(s) in {} (base name: {})",
                loaded.skills.len(),
                loaded.resolved.local_dir.display(),
                loaded.base_name.cyan()
            );
        }
    }

    if args.dry && !args.json {
        println!("\n{}", "dry run:".cyan().bold());
    }

    let linker = Linker::new(&args.destination, args.dry);
    let results = linker.sync(&desired);

    report(&results, args.dry, args.json)?;
    fail_on_errors(&results, "sync")
}
