//! Command handlers and shared report output.

pub mod install;
pub mod list;
pub mod sync;
pub mod update;


use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;

use skilla::linker::{self, LinkResult, LinkSummary};

/// JSON form of a [`LinkResult`]
#[derive(Serialize, Debug, PartialEq)]
pub struct LinkRecord {
    pub name: String,
    pub target: String,
    pub action: Option<&'static str>,
    pub dry_run: bool,
    pub error: Option<String>,
}

impl LinkRecord {
    pub fn from_result(result: &LinkResult, dry_run: bool) -> Self {
        Self {
            name: result.name.clone(),
            target: result.target.display().to_string(),
            action: result.action.map(|a| a.as_str()),
            dry_run,
            error: result.error.as_ref().map(|e| e.to_string()),
        }
    }
}

/// Print results as coloured text or JSON, then a summary line.
pub fn report(results: &[LinkResult], dry_run: bool, json: bool) -> Result<()> {
    if json {
        let records: Vec<LinkRecord> = results
            .iter()
            .map(|r| LinkRecord::from_result(r, dry_run))
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    linker::print_results(results, dry_run);

    let summary = LinkSummary::from_results(results);
    println!(
        "\n  Created: {}, Updated: {}, Skipped: {}, Removed: {}, Errors: {}",
        summary.created.to_string().green(),
        summary.updated.to_string().yellow(),
        summary.skipped.to_string().dimmed(),
        summary.removed.to_string().yellow(),
        if summary.errors > 0 {
            summary.errors.to_string().red()
        } else {
            summary.errors.to_string().dimmed()
        }
    );
    Ok(())
}

/// Fail the command when any result carries an error.
pub fn fail_on_errors(results: &[LinkResult], command: &str) -> Result<()> {
    let errors = results.iter().filter(|r| r.is_error()).count();
    if errors > 0 {
        bail!("{errors} error(s) during {command}");
    }
    Ok(())
}
