//! Desired link state
//!
//! Loads sources (resolve, materialize, discover) and folds their skills into
//! a single `name -> absolute target` map. When two sources produce the same
//! name, the later source wins.

use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::finder::{FoundSkill, find_all};
use crate::git::Materializer;
use crate::namer::{is_flat_name, skill_name};
use crate::source::{ResolvedSource, absolute_clean, resolve};

/// A source ready for linking
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub resolved: ResolvedSource,
    /// Base name for skill naming (`--name` override or the resolved name)
    pub base_name: String,
    pub skills: Vec<FoundSkill>,
}

/// Resolve `identifier`, clone it if remote, and discover its skills.
pub fn load_source(
    identifier: &str,
    name_override: Option<&str>,
    settings: &Settings,
    materializer: &dyn Materializer,
) -> Result<LoadedSource> {
    let resolved = resolve(identifier, settings)
        .with_context(|| format!("Failed to resolve source: {identifier}"))?;

    let base_name = name_override
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| resolved.name.clone());
    if !is_flat_name(&base_name) {
        bail!("invalid base name {base_name:?}: must be a single path component");
    }

    if let Some(remote) = &resolved.remote {
        materializer
            .ensure_cloned(
                &remote.repo_path,
                &remote.repo_dir,
                remote.sub_path.as_deref(),
            )
            .with_context(|| format!("Failed to clone source: {identifier}"))?;
    }

    if !resolved.local_dir.is_dir() {
        bail!(
            "source directory not found: {}",
            resolved.local_dir.display()
        );
    }

    let skills = find_all(&resolved.local_dir)
        .with_context(|| format!("Failed to find skills in {identifier}"))?;

    Ok(LoadedSource {
        resolved,
        base_name,
        skills,
    })
}

/// Desired destination state, ordered by name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DesiredLinks {
    links: BTreeMap<String, PathBuf>,
}

impl DesiredLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link, replacing any earlier entry with the same name.
    pub fn insert(&mut self, name: String, target: PathBuf) -> Option<PathBuf> {
        let previous = self.links.insert(name.clone(), target);
        if let Some(prev) = &previous {
            tracing::debug!(%name, previous = %prev.display(), "Later source overrides link");
        }
        previous
    }

    /// Add every skill of `source` under its derived flat name.
    pub fn add_source(&mut self, source: &LoadedSource) -> Result<()> {
        for skill in &source.skills {
            let name = skill_name(&source.base_name, &skill.rel_path);
            let target = absolute_clean(&skill.skill_dir).with_context(|| {
                format!("Failed to get absolute path: {}", skill.skill_dir.display())
            })?;
            self.insert(name, target);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.links.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.links.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.links.iter().map(|(n, t)| (n.as_str(), t.as_path()))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
