use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use skilla::{DesiredLinks, Linker, Materializer, Settings, load_source};

use super::{fail_on_errors, report};

/// Arguments for the install command
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Skill source (git host path, browser URL, or local directory)
    #[arg(long)]
    pub source: String,

    /// Destination directory for skill symlinks
    #[arg(long)]
    pub destination: PathBuf,

    /// Override base name for skill naming (default: derived from source)
    #[arg(long)]
    pub name: Option<String>,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry: bool,

    /// Output machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Link every skill of one source into the destination. Existing links
/// that the source does not produce are left in place.
pub fn run_install(
    args: InstallArgs,
    settings: &Settings,
    materializer: &dyn Materializer,
) -> Result<()> {
    let loaded = load_source(&args.source, args.name.as_deref(), settings, materializer)?;

    if loaded.skills.is_empty() {
        if args.json {
            println!("[]");
        } else {
            println!("{}", "no SKILL.md files found in source".yellow());
        }
        return Ok(());
    }

    if !args.json {
        println!(
            "found {} skill(s) in {} (base name: {})",
            loaded.skills.len(),
            loaded.resolved.local_dir.display(),
            loaded.base_name.cyan()
        );
    }

    let mut desired = DesiredLinks::new();
    desired.add_source(&loaded)?;

    let linker = Linker::new(&args.destination, args.dry);
    let results = linker.install(&desired);

    report(&results, args.dry, args.json)?;
    fail_on_errors(&results, "install")
}
