//! Symbolic link reconciliation
//!
//! Converges a destination directory to a desired set of `name -> target`
//! symlinks. The destination is scanned once; each desired name is then
//! classified against that snapshot:
//!
//! | current state            | action   |
//! |--------------------------|----------|
//! | absent                   | create   |
//! | symlink, same target     | skip     |
//! | symlink, other target    | update   |
//! | not a symlink            | error    |
//! | symlink, not desired     | remove (sync only) |
//!
//! Failures are recorded on the affected [`LinkResult`] and never stop the
//! remaining names from being processed.

use colored::Colorize;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::SKILL_MARKER;
use crate::desired::DesiredLinks;
use crate::namer::is_flat_name;

/// Classification of a single destination entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Skip,
    Remove,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Skip => "skip",
            Action::Remove => "remove",
        }
    }

    /// Verb for reports; mutating actions read "would ..." in dry-run mode
    pub fn verb(self, dry_run: bool) -> String {
        match (self, dry_run) {
            (Action::Skip, _) | (_, false) => self.as_str().to_string(),
            (_, true) => format!("would {}", self.as_str()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("unexpected file at {}", .0.display())]
    UnexpectedFile(PathBuf),
    #[error("invalid link name {0:?}")]
    InvalidName(String),
    #[error("create dest dir: {0}")]
    CreateDir(#[source] io::Error),
    #[error("read dest dir: {0}")]
    ReadDir(#[source] io::Error),
    #[error("remove old symlink: {0}")]
    RemoveOld(#[source] io::Error),
    #[error("symlink: {0}")]
    Symlink(#[source] io::Error),
    #[error("remove: {0}")]
    Remove(#[source] io::Error),
}

/// Outcome for one destination name
#[derive(Debug)]
pub struct LinkResult {
    pub name: String,
    pub target: PathBuf,
    /// `None` for conflicts and whole-run failures
    pub action: Option<Action>,
    pub error: Option<LinkError>,
}

impl LinkResult {
    fn ok(name: &str, target: &Path, action: Action) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_path_buf(),
            action: Some(action),
            error: None,
        }
    }

    fn failed(name: &str, target: &Path, action: Option<Action>, error: LinkError) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_path_buf(),
            action,
            error: Some(error),
        }
    }

    fn run_failure(error: LinkError) -> Self {
        Self::failed("", Path::new(""), None, error)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Counts of each outcome in a reconciliation run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LinkSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub removed: usize,
    pub errors: usize,
}

impl LinkSummary {
    pub fn from_results(results: &[LinkResult]) -> Self {
        let mut summary = Self::default();
        for r in results {
            if r.is_error() {
                summary.errors += 1;
                continue;
            }
            match r.action {
                Some(Action::Create) => summary.created += 1,
                Some(Action::Update) => summary.updated += 1,
                Some(Action::Skip) => summary.skipped += 1,
                Some(Action::Remove) => summary.removed += 1,
                None => {}
            }
        }
        summary
    }
}

/// Whether links absent from the desired set are removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Additive only
    Install,
    /// Full convergence, including removals
    Sync,
}

/// Snapshot of a destination directory
#[derive(Debug, Default)]
pub struct DestinationScan {
    /// Symlinks by name, with their literal targets
    pub links: BTreeMap<String, PathBuf>,
    /// Names of entries that are not symlinks
    pub others: BTreeSet<String>,
    /// Symlinks whose names are not UTF-8; never desired, so only removed
    pub non_utf8_links: Vec<(OsString, PathBuf)>,
}

/// Read the immediate entries of `dest_dir`.
///
/// A missing directory scans as empty.
pub fn scan_destination(dest_dir: &Path) -> io::Result<DestinationScan> {
    let mut scan = DestinationScan::default();

    let entries = match fs::read_dir(dest_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(scan),
        Err(e) => return Err(e),
    };

    for entry in entries {
        let entry = entry?;
        let is_symlink = entry.file_type()?.is_symlink();
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) if is_symlink => {
                match fs::read_link(entry.path()) {
                    Ok(target) => scan.non_utf8_links.push((raw, target)),
                    Err(e) => tracing::warn!(entry = ?raw, error = %e, "Failed to read symlink"),
                }
                continue;
            }
            Err(raw) => {
                tracing::debug!(entry = ?raw, "Skipping non UTF-8 entry");
                continue;
            }
        };

        if !is_symlink {
            scan.others.insert(name);
            continue;
        }
        match fs::read_link(entry.path()) {
            Ok(target) => {
                scan.links.insert(name, target);
            }
            Err(e) => tracing::warn!(%name, error = %e, "Failed to read symlink"),
        }
    }

    Ok(scan)
}

/// Manages skill symlinks in a destination directory
#[derive(Debug)]
pub struct Linker {
    dest_dir: PathBuf,
    dry_run: bool,
}

impl Linker {
    pub fn new(dest_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            dry_run,
        }
    }

    /// Create and update links for `desired`; never removes anything.
    pub fn install(&self, desired: &DesiredLinks) -> Vec<LinkResult> {
        self.reconcile(desired, ReconcileMode::Install)
    }

    /// Make the destination match `desired` exactly.
    pub fn sync(&self, desired: &DesiredLinks) -> Vec<LinkResult> {
        self.reconcile(desired, ReconcileMode::Sync)
    }

    /// Reconcile the destination against `desired`.
    ///
    /// Results are sorted by name. A failure to create or read the
    /// destination directory yields a single error result.
    pub fn reconcile(&self, desired: &DesiredLinks, mode: ReconcileMode) -> Vec<LinkResult> {
        if !self.dry_run
            && let Err(e) = fs::create_dir_all(&self.dest_dir)
        {
            return vec![LinkResult::run_failure(LinkError::CreateDir(e))];
        }

        let current = match scan_destination(&self.dest_dir) {
            Ok(scan) => scan,
            Err(e) => return vec![LinkResult::run_failure(LinkError::ReadDir(e))],
        };

        let mut results = Vec::with_capacity(desired.len());

        for (name, target) in desired.iter() {
            results.push(self.apply_desired(name, target, &current));
        }

        if mode == ReconcileMode::Sync {
            for (name, target) in &current.links {
                if desired.contains(name) {
                    continue;
                }
                results.push(self.apply_remove(name, &self.dest_dir.join(name), target));
            }
            for (raw, target) in &current.non_utf8_links {
                let name = raw.to_string_lossy();
                results.push(self.apply_remove(&name, &self.dest_dir.join(raw), target));
            }
        }

        results.sort_by(|a, b| a.name.cmp(&b.name));
        results
    }

    fn apply_desired(&self, name: &str, target: &Path, current: &DestinationScan) -> LinkResult {
        if !is_flat_name(name) {
            tracing::error!(%name, "Refusing link name outside destination");
            return LinkResult::failed(name, target, None, LinkError::InvalidName(name.to_string()));
        }
        let link_path = self.dest_dir.join(name);

        let action = match current.links.get(name) {
            Some(existing) if existing.as_os_str() == target.as_os_str() => {
                return LinkResult::ok(name, target, Action::Skip);
            }
            Some(_) => Action::Update,
            None if current.others.contains(name) => {
                tracing::error!(%name, path = %link_path.display(), "Refusing to replace non-symlink");
                return LinkResult::failed(name, target, None, LinkError::UnexpectedFile(link_path));
            }
            None => Action::Create,
        };

        if self.dry_run {
            return LinkResult::ok(name, target, action);
        }

        if action == Action::Update
            && let Err(e) = remove_symlink(&link_path)
        {
            tracing::error!(%name, error = %e, "Failed to remove old symlink");
            return LinkResult::failed(name, target, Some(action), LinkError::RemoveOld(e));
        }

        match create_symlink(target, &link_path) {
            Ok(()) => LinkResult::ok(name, target, action),
            Err(e) => {
                tracing::error!(%name, error = %e, "Failed to create symlink");
                LinkResult::failed(name, target, Some(action), LinkError::Symlink(e))
            }
        }
    }

    fn apply_remove(&self, name: &str, link_path: &Path, target: &Path) -> LinkResult {
        if !self.dry_run
            && let Err(e) = remove_symlink(link_path)
        {
            tracing::error!(%name, error = %e, "Failed to remove symlink");
            return LinkResult::failed(name, target, Some(Action::Remove), LinkError::Remove(e));
        }
        LinkResult::ok(name, target, Action::Remove)
    }
}

/// A symlink in the destination whose target holds a `SKILL.md`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledSkill {
    pub name: String,
    pub target: PathBuf,
}

/// List the installed skills in `dest_dir`, ordered by name.
///
/// Relative link targets are resolved against `dest_dir`.
pub fn installed_skills(dest_dir: &Path) -> io::Result<Vec<InstalledSkill>> {
    fs::metadata(dest_dir)?;
    let scan = scan_destination(dest_dir)?;

    Ok(scan
        .links
        .into_iter()
        .filter(|(_, target)| dest_dir.join(target).join(SKILL_MARKER).exists())
        .map(|(name, target)| InstalledSkill { name, target })
        .collect())
}

/// Print reconciliation results, one line per name
pub fn print_results(results: &[LinkResult], dry_run: bool) {
    for r in results {
        if let Some(err) = &r.error {
            let name = if r.name.is_empty() { "-" } else { r.name.as_str() };
            println!("  {} {:<14} {}: {}", "✗".red(), "error".red(), name, err);
            continue;
        }
        let Some(action) = r.action else { continue };
        let verb = format!("{:<14}", action.verb(dry_run));
        let line = format!("{} -> {}", r.name, r.target.display());
        match action {
            Action::Skip => println!("  {} {} {}", "✔".green(), verb.dimmed(), line.dimmed()),
            _ if dry_run => println!("  {} {} {}", "→".cyan(), verb.cyan(), line),
            Action::Create => println!("  {} {} {}", "✔".green(), verb.green(), line),
            Action::Update => println!("  {} {} {}", "✔".green(), verb.yellow(), line),
            Action::Remove => println!("  {} {} {}", "○".yellow(), verb.yellow(), line),
        }
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(unix)]
fn remove_symlink(link: &Path) -> io::Result<()> {
    fs::remove_file(link)
}

#[cfg(windows)]
fn remove_symlink(link: &Path) -> io::Result<()> {
    // Directory symlinks on Windows are removed as directories.
    fs::remove_dir(link).or_else(|_| fs::remove_file(link))
}
