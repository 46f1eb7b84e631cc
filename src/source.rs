//! Source identity resolution
//!
//! Turns a source identifier given on the command line into a
//! [`ResolvedSource`]. Identifiers are one of:
//!
//! - a local directory (`./my-skills`, `/abs/path`)
//! - a bare remote path (`github.com/org/repo[/sub/path]`)
//! - a browser URL (`https://github.com/org/repo/tree/main/sub/path`)
//!
//! Remote detection is a prefix match against [`RemoteHost`]; anything else
//! is a local path, even if it looks like a URL.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::config::Settings;
use crate::namer::flatten;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("failed to resolve absolute path for {path}: {source}")]
    AbsolutePath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Git hosts recognized as remote sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteHost {
    GitHub,
    GitLab,
    Bitbucket,
    Codeberg,
}

impl RemoteHost {
    pub const ALL: [RemoteHost; 4] = [
        RemoteHost::GitHub,
        RemoteHost::GitLab,
        RemoteHost::Bitbucket,
        RemoteHost::Codeberg,
    ];

    pub fn domain(self) -> &'static str {
        match self {
            RemoteHost::GitHub => "github.com",
            RemoteHost::GitLab => "gitlab.com",
            RemoteHost::Bitbucket => "bitbucket.org",
            RemoteHost::Codeberg => "codeberg.org",
        }
    }

    /// Host whose `<domain>/` prefix starts `identifier`
    pub fn detect(identifier: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|host| {
            identifier
                .strip_prefix(host.domain())
                .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Whether `identifier` names a repository on a known git host
pub fn is_remote(identifier: &str) -> bool {
    RemoteHost::detect(identifier).is_some()
}

/// Canonicalize a source identifier.
///
/// Strips an `http://` or `https://` scheme and a `/tree/<branch>` (or GitLab
/// `/-/tree/<branch>`) segment from remote URLs, keeping any subpath after the
/// branch. Local paths are returned unchanged.
pub fn normalize(raw: &str) -> String {
    let bare = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw);

    if !is_remote(bare) {
        return raw.to_string();
    }

    let segments: Vec<&str> = bare
        .trim_end_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() <= 3 {
        return segments.join("/");
    }

    let (repo, rest) = segments.split_at(3);
    let rest = match rest {
        ["tree", _branch, sub @ ..] | ["-", "tree", _branch, sub @ ..] => sub,
        other => other,
    };

    repo.iter().chain(rest).copied().collect::<Vec<_>>().join("/")
}

/// Split a normalized remote identifier into `(host/org/repo, subpath)`.
///
/// The subpath is empty when the identifier has three or fewer segments.
pub fn parse_remote(identifier: &str) -> (String, String) {
    let mut parts = identifier.splitn(4, '/');
    let repo: Vec<&str> = parts.by_ref().take(3).collect();
    let sub = parts.next().unwrap_or("").trim_matches('/');
    (repo.join("/"), sub.to_string())
}

/// Remote repository details of a resolved source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    /// Repository identity, `host/org/repo`
    pub repo_path: String,
    /// Clone location under the storage root
    pub repo_dir: PathBuf,
    /// Subtree within the repository, if one was requested
    pub sub_path: Option<String>,
}

/// Result of resolving a source identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Normalized identifier
    pub identifier: String,
    /// Directory searched for skills (clone dir + subpath, or the local path)
    pub local_dir: PathBuf,
    /// Flat, filesystem-safe base name used for skill naming
    pub name: String,
    /// Set for remote sources
    pub remote: Option<RemoteRepo>,
}

impl ResolvedSource {
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }
}

/// Resolve a raw source identifier.
///
/// Remote sources resolve to a directory under the storage root which may
/// not exist yet. Local sources resolve to their absolute path.
pub fn resolve(raw: &str, settings: &Settings) -> Result<ResolvedSource, SourceError> {
    let identifier = normalize(raw);

    if is_remote(&identifier) {
        let (repo_path, sub_path) = parse_remote(&identifier);
        let repo_dir = settings.storage_dir(&flatten(&repo_path))?;
        let local_dir = if sub_path.is_empty() {
            repo_dir.clone()
        } else {
            repo_dir.join(&sub_path)
        };
        tracing::debug!(%identifier, repo = %repo_path, dir = %local_dir.display(), "resolved remote source");

        return Ok(ResolvedSource {
            name: flatten(&identifier),
            local_dir,
            remote: Some(RemoteRepo {
                repo_path,
                repo_dir,
                sub_path: (!sub_path.is_empty()).then_some(sub_path),
            }),
            identifier,
        });
    }

    let local_dir = absolute_clean(Path::new(&identifier)).map_err(|source| {
        SourceError::AbsolutePath {
            path: identifier.clone(),
            source,
        }
    })?;
    let name = local_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| local_dir.to_string_lossy().into_owned());
    tracing::debug!(%identifier, dir = %local_dir.display(), "resolved local source");

    Ok(ResolvedSource {
        identifier,
        local_dir,
        name,
        remote: None,
    })
}

/// Absolute, lexically cleaned form of `path`. Symlinks are not resolved.
pub fn absolute_clean(path: &Path) -> std::io::Result<PathBuf> {
    let abs = std::path::absolute(path)?;
    let mut cleaned = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize() {
        let cases = [
            (
                "https://github.com/hayeah/dotfiles/tree/master/skills",
                "github.com/hayeah/dotfiles/skills",
            ),
            (
                "https://github.com/hayeah/dotfiles/tree/main/foo/bar",
                "github.com/hayeah/dotfiles/foo/bar",
            ),
            (
                "https://github.com/hayeah/skills/tree/master",
                "github.com/hayeah/skills",
            ),
            ("https://github.com/hayeah/skills", "github.com/hayeah/skills"),
            (
                "http://github.com/hayeah/skills/tree/main/foo",
                "github.com/hayeah/skills/foo",
            ),
            (
                "https://gitlab.com/org/repo/-/tree/main/deep/path",
                "gitlab.com/org/repo/deep/path",
            ),
            ("github.com/hayeah/skills", "github.com/hayeah/skills"),
            ("github.com/hayeah/skills/foo", "github.com/hayeah/skills/foo"),
            ("./my-skills", "./my-skills"),
            ("/abs/path", "/abs/path"),
            ("https://example.com/org/repo", "https://example.com/org/repo"),
        ];
        for (input, want) in cases {
            assert_eq!(normalize(input), want, "normalize({input:?})");
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("https://github.com/hayeah/dotfiles/tree/master/skills");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_is_remote_allow_list() {
        assert!(is_remote("github.com/hayeah/skills"));
        assert!(is_remote("gitlab.com/org/repo"));
        assert!(is_remote("bitbucket.org/org/repo"));
        assert!(is_remote("codeberg.org/org/repo"));
        assert!(!is_remote("example.com/org/repo"));
        assert!(!is_remote("github.company.internal/org/repo"));
        assert!(!is_remote("./github.com/org/repo"));
        assert!(!is_remote("github.com"));
    }

    #[test]
    fn test_parse_remote() {
        let cases = [
            ("github.com/hayeah/skills", "github.com/hayeah/skills", ""),
            ("github.com/hayeah/skills/foo", "github.com/hayeah/skills", "foo"),
            (
                "github.com/hayeah/skills/foo/bar",
                "github.com/hayeah/skills",
                "foo/bar",
            ),
            ("gitlab.com/org/repo", "gitlab.com/org/repo", ""),
            (
                "gitlab.com/org/repo/deep/path",
                "gitlab.com/org/repo",
                "deep/path",
            ),
        ];
        for (input, repo, sub) in cases {
            assert_eq!(
                parse_remote(input),
                (repo.to_string(), sub.to_string()),
                "parse_remote({input:?})"
            );
        }
    }

    #[test]
    fn test_resolve_remote_with_subpath() {
        let settings = Settings::new(Some("/srv/skilla".to_string()));
        let resolved = resolve(
            "https://github.com/hayeah/dotfiles/tree/master/skills",
            &settings,
        )
        .unwrap();

        assert!(resolved.is_remote());
        assert_eq!(resolved.identifier, "github.com/hayeah/dotfiles/skills");
        assert_eq!(resolved.name, "github.com_hayeah_dotfiles_skills");
        assert_eq!(
            resolved.local_dir,
            PathBuf::from("/srv/skilla/github.com_hayeah_dotfiles/skills")
        );

        let remote = resolved.remote.unwrap();
        assert_eq!(remote.repo_path, "github.com/hayeah/dotfiles");
        assert_eq!(
            remote.repo_dir,
            PathBuf::from("/srv/skilla/github.com_hayeah_dotfiles")
        );
        assert_eq!(remote.sub_path.as_deref(), Some("skills"));
    }

    #[test]
    fn test_resolve_remote_without_subpath() {
        let settings = Settings::new(Some("/srv/skilla".to_string()));
        let resolved = resolve("github.com/hayeah/skills", &settings).unwrap();

        assert_eq!(resolved.name, "github.com_hayeah_skills");
        let remote = resolved.remote.as_ref().unwrap();
        assert_eq!(remote.sub_path, None);
        assert_eq!(resolved.local_dir, remote.repo_dir);
    }

    #[test]
    fn test_resolve_is_stable() {
        let settings = Settings::new(Some("/srv/skilla".to_string()));
        let a = resolve("github.com/hayeah/skills/foo", &settings).unwrap();
        let b = resolve("https://github.com/hayeah/skills/tree/main/foo", &settings).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_local() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("my-skills");
        std::fs::create_dir_all(&dir).unwrap();

        let settings = Settings::default();
        let resolved = resolve(dir.to_str().unwrap(), &settings).unwrap();

        assert!(!resolved.is_remote());
        assert_eq!(resolved.name, "my-skills");
        assert_eq!(resolved.local_dir, dir);
    }

    #[test]
    fn test_resolve_local_relative_is_absolute() {
        let resolved = resolve("./some/../my-skills", &Settings::default()).unwrap();
        assert!(resolved.local_dir.is_absolute());
        assert_eq!(resolved.name, "my-skills");
        assert!(resolved.local_dir.ends_with("my-skills"));
    }

    #[test]
    fn test_absolute_clean() {
        let cleaned = absolute_clean(Path::new("/a/./b/../c")).unwrap();
        assert_eq!(cleaned, PathBuf::from("/a/c"));
    }
}
