//! Skilla CLI
//!
//! Command-line interface for installing and syncing agent skills.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

use skilla::{GitCli, Settings};

mod commands;

use commands::{install, list, sync, update};

#[derive(Parser)]
#[command(name = "skilla")]
#[command(
    author,
    version,
    about = "Install and sync agent skills using symbolic links"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Root directory for cloned remote sources (default: ~/.skilla)
    #[arg(long, global = true, env = "SKILLA_PATH", value_name = "DIR")]
    storage: Option<String>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link skills from one source into a destination (never removes links)
    Install(install::InstallArgs),

    /// Make a destination match one or more sources exactly
    Sync(sync::SyncArgs),

    /// List installed skills in a destination
    List(list::ListArgs),

    /// Fetch and fast-forward a previously cloned remote source
    Update(update::UpdateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::new(cli.storage);
    let git = GitCli;

    match cli.command {
        Commands::Install(args) => install::run_install(args, &settings, &git),
        Commands::Sync(args) => sync::run_sync(args, &settings, &git),
        Commands::List(args) => list::run_list(args),
        Commands::Update(args) => update::run_update(args, &settings, &git),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
