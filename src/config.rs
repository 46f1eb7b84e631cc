//! Runtime settings for skilla
//!
//! Settings are built once by the binary (from flags and the environment)
//! and handed to every command explicitly.

use std::path::{Path, PathBuf};

use crate::source::SourceError;

/// Environment variable overriding the storage root for cloned sources
pub const STORAGE_ENV_VAR: &str = "SKILLA_PATH";

/// Default storage directory name, relative to the home directory
pub const DEFAULT_STORAGE_DIR: &str = ".skilla";

/// Marker file that identifies a skill directory
pub const SKILL_MARKER: &str = "SKILL.md";

/// Settings shared by all commands
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Raw storage root override (`SKILLA_PATH` or `--storage`), `~` not yet expanded
    pub storage_override: Option<String>,
}

impl Settings {
    /// Create settings with an optional storage root override.
    ///
    /// An empty override is treated as unset.
    pub fn new(storage_override: Option<String>) -> Self {
        Self {
            storage_override: storage_override.filter(|s| !s.is_empty()),
        }
    }

    /// Root directory under which remote sources are cloned.
    ///
    /// The home directory is only consulted when the override is unset or
    /// starts with `~`.
    pub fn storage_root(&self) -> Result<PathBuf, SourceError> {
        self.storage_root_with(dirs::home_dir)
    }

    fn storage_root_with<F>(&self, home: F) -> Result<PathBuf, SourceError>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        match self.storage_override.as_deref() {
            None => home()
                .map(|h| h.join(DEFAULT_STORAGE_DIR))
                .ok_or(SourceError::NoHomeDir),
            Some(raw) => expand_tilde(raw, home),
        }
    }

    /// Directory a repository identity is cloned into
    pub fn storage_dir(&self, storage_name: &str) -> Result<PathBuf, SourceError> {
        Ok(self.storage_root()?.join(storage_name))
    }
}

/// Expand a leading `~` or `~/` to the home directory.
pub fn expand_tilde<F>(raw: &str, home: F) -> Result<PathBuf, SourceError>
where
    F: FnOnce() -> Option<PathBuf>,
{
    if raw == "~" {
        return home().ok_or(SourceError::NoHomeDir);
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        let home = home().ok_or(SourceError::NoHomeDir)?;
        return Ok(home.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}
