use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use skilla::source::resolve;
use skilla::{GitError, Materializer, Settings};

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Remote source to update (git host path or browser URL)
    #[arg(long)]
    pub source: String,
}

/// Fetch and fast-forward the clone behind a remote source. Divergent
/// history is reported as an error and left for the user to resolve.
pub fn run_update(
    args: UpdateArgs,
    settings: &Settings,
    materializer: &dyn Materializer,
) -> Result<()> {
    let resolved = resolve(&args.source, settings)
        .with_context(|| format!("Failed to resolve source: {}", args.source))?;

    let Some(remote) = resolved.remote else {
        return Err(GitError::NotRemote.into());
    };

    if !remote.repo_dir.exists() {
        return Err(GitError::NotCloned {
            path: remote.repo_dir.display().to_string(),
        }
        .into());
    }

    materializer
        .fetch(&remote.repo_dir)
        .with_context(|| format!("Failed to update {}", remote.repo_path))?;

    println!("{} {}", "✔ Updated".green(), remote.repo_path);
    Ok(())
}
