//! Skill discovery
//!
//! Walks a source tree and reports every directory that directly contains
//! the `SKILL.md` marker.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SKILL_MARKER;

/// A discovered skill directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundSkill {
    /// Source root that was searched
    pub root_dir: PathBuf,
    /// Directory containing `SKILL.md` (may equal `root_dir`)
    pub skill_dir: PathBuf,
    /// `skill_dir` relative to `root_dir`, `""` for a root skill
    pub rel_path: String,
}

/// Find all skills below `root_dir`, ordered by path.
///
/// `.git` directories are not descended into.
pub fn find_all(root_dir: &Path) -> Result<Vec<FoundSkill>> {
    let mut found = Vec::new();

    let walker = WalkDir::new(root_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == ".git"));

    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", root_dir.display()))?;
        if entry.file_type().is_dir() || entry.file_name() != SKILL_MARKER {
            continue;
        }

        let Some(skill_dir) = entry.path().parent() else {
            continue;
        };
        let rel_path = skill_dir
            .strip_prefix(root_dir)
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default();

        tracing::debug!(skill = %skill_dir.display(), rel = %rel_path, "found skill");
        found.push(FoundSkill {
            root_dir: root_dir.to_path_buf(),
            skill_dir: skill_dir.to_path_buf(),
            rel_path,
        });
    }

    Ok(found)
}
