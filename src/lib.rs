//! Skilla - Agent Skill Installation and Synchronization
//!
//! Discovers skills (directories containing a `SKILL.md`) in local directories
//! or git repositories and links them into a flat skills directory using
//! symbolic links. Remote sources are cloned once and reused; the destination
//! is reconciled against the desired set on every run.

pub mod config;
pub mod desired;
pub mod finder;
pub mod git;
pub mod linker;
pub mod namer;
pub mod source;

pub use config::Settings;
pub use desired::{DesiredLinks, LoadedSource, load_source};
pub use finder::{FoundSkill, find_all};
pub use git::{GitCli, GitError, Materializer};
pub use linker::{Action, LinkError, LinkResult, LinkSummary, Linker, ReconcileMode};
pub use namer::skill_name;
pub use source::{RemoteHost, ResolvedSource, SourceError};
