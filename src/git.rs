//! Remote source materialization
//!
//! Clones and fetches remote sources with the system `git` binary, which
//! picks up the user's SSH keys, credential helpers and `~/.gitconfig`.
//! Git's own output is streamed to stderr so that stdout stays usable for
//! machine-readable reports.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use std::process::{Command, ExitStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git {args} failed ({status})")]
    Failed { args: String, status: ExitStatus },
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("update only applies to remote sources; use git pull for local repos")]
    NotRemote,
    #[error("source not yet cloned; run install first: {path}")]
    NotCloned { path: String },
}

/// Puts remote source content on local disk
pub trait Materializer {
    /// Clone `repo_path` into `repo_dir` unless it is already there.
    ///
    /// With a `sub_path`, only that subtree is checked out; a subtree missing
    /// from an existing sparse clone is added without recloning.
    fn ensure_cloned(
        &self,
        repo_path: &str,
        repo_dir: &Path,
        sub_path: Option<&str>,
    ) -> Result<(), GitError>;

    /// Fetch and fast-forward `repo_dir`. Divergent history is an error.
    fn fetch(&self, repo_dir: &Path) -> Result<(), GitError>;
}

/// HTTPS clone URL for a `host/org/repo` identity
pub fn clone_url(repo_path: &str) -> String {
    format!("https://{repo_path}.git")
}

/// [`Materializer`] backed by the `git` command line client
#[derive(Debug, Clone, Default)]
pub struct GitCli;

impl GitCli {
    fn run<I, S>(&self, dir: Option<&Path>, args: I) -> Result<(), GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> =
            args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let shown = args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = Command::new("git");
        if let Some(dir) = dir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(&args).stdout(std::io::stderr());

        tracing::debug!(args = %shown, "running git");
        let status = cmd.status().map_err(|source| GitError::Spawn {
            args: shown.clone(),
            source,
        })?;

        if !status.success() {
            return Err(GitError::Failed {
                args: shown,
                status,
            });
        }
        Ok(())
    }

    fn clone_full(&self, url: &str, repo_dir: &Path) -> Result<(), GitError> {
        self.run(
            None,
            [
                OsStr::new("clone"),
                OsStr::new("--filter=tree:0"),
                OsStr::new(url),
                repo_dir.as_os_str(),
            ],
        )
    }

    fn clone_sparse(&self, url: &str, repo_dir: &Path, sub_path: &str) -> Result<(), GitError> {
        self.run(
            None,
            [
                OsStr::new("clone"),
                OsStr::new("--filter=tree:0"),
                OsStr::new("--sparse"),
                OsStr::new(url),
                repo_dir.as_os_str(),
            ],
        )?;
        self.sparse_add(repo_dir, sub_path)
    }

    fn sparse_add(&self, repo_dir: &Path, sub_path: &str) -> Result<(), GitError> {
        self.run(Some(repo_dir), ["sparse-checkout", "add", sub_path])
    }
}

impl Materializer for GitCli {
    fn ensure_cloned(
        &self,
        repo_path: &str,
        repo_dir: &Path,
        sub_path: Option<&str>,
    ) -> Result<(), GitError> {
        if !repo_dir.join(".git").exists() {
            if let Some(parent) = repo_dir.parent() {
                fs::create_dir_all(parent).map_err(|source| GitError::CreateDir {
                    path: parent.display().to_string(),
                    source,
                })?;
            }

            let url = clone_url(repo_path);
            tracing::info!(%url, dir = %repo_dir.display(), "cloning");
            return match sub_path {
                Some(sub) => self.clone_sparse(&url, repo_dir, sub),
                None => self.clone_full(&url, repo_dir),
            };
        }

        let Some(sub) = sub_path else {
            return Ok(());
        };
        if repo_dir.join(sub).exists() {
            return Ok(());
        }
        tracing::info!(path = %sub, "adding sparse checkout path");
        self.sparse_add(repo_dir, sub)
    }

    fn fetch(&self, repo_dir: &Path) -> Result<(), GitError> {
        tracing::info!(dir = %repo_dir.display(), "fetching");
        self.run(Some(repo_dir), ["fetch", "--all"])?;
        self.run(Some(repo_dir), ["merge", "--ff-only", "@{u}"])
    }
}
