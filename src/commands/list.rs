use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::io;
use std::path::PathBuf;

use skilla::linker::{InstalledSkill, installed_skills};

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Destination directory to inspect
    #[arg(long)]
    pub destination: PathBuf,

    /// Output machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ListEntry {
    name: String,
    target: String,
}

impl From<InstalledSkill> for ListEntry {
    fn from(skill: InstalledSkill) -> Self {
        Self {
            name: skill.name,
            target: skill.target.display().to_string(),
        }
    }
}

pub fn run_list(args: ListArgs) -> Result<()> {
    let skills = match installed_skills(&args.destination) {
        Ok(skills) => skills,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if args.json {
                println!("[]");
            } else {
                println!("destination {} does not exist", args.destination.display());
            }
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to read destination: {}", args.destination.display())
            });
        }
    };

    if args.json {
        let entries: Vec<ListEntry> = skills.into_iter().map(ListEntry::from).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if skills.is_empty() {
        println!("no skills installed");
        return Ok(());
    }

    for skill in &skills {
        println!(
            "  {:<50} {} {}",
            skill.name,
            "→".cyan(),
            skill.target.display().to_string().dimmed()
        );
    }
    println!("\n{} skill(s) installed", skills.len());
    Ok(())
}
