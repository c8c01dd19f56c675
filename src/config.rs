//! Persisted configuration: data model, YAML store, and schema migration.
//!
//! The config lives in a single YAML file. Every load runs the two
//! migration passes (key re-keying, then on-disk directory re-encoding)
//! and persists the result when anything changed, so the rest of the
//! program only ever sees the current schema.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::paths;

/// Schema version stamped by the first key-format migration.
pub const CONFIG_SCHEMA_VERSION: &str = "0.1.0";

/// Delimiter of the composite worktree key. `-` was used historically and
/// is ambiguous when both alias and branch contain hyphens.
pub const WORKTREE_KEY_DELIMITER: &str = "::";

/// Environment override for the config file location (used by tests).
pub const CONFIG_PATH_ENV: &str = "REPO_CLI_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repos: Option<BTreeMap<String, RepoEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktrees: Option<BTreeMap<String, WorktreeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub url: String,
    /// `owner/name` slug from a recognized hosting URL, absent otherwise.
    #[serde(default)]
    pub owner_repo: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A worktree entry as stored. Values that do not parse as a full entry
/// are carried opaquely and must survive load/migrate/save untouched;
/// re-keying still applies to any of them holding a `repo`/`branch` pair
/// (see [`WorktreeRecord::repo_branch`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorktreeRecord {
    Entry(WorktreeEntry),
    Other(serde_yaml::Value),
}

impl WorktreeRecord {
    pub fn as_entry(&self) -> Option<&WorktreeEntry> {
        match self {
            WorktreeRecord::Entry(entry) => Some(entry),
            WorktreeRecord::Other(_) => None,
        }
    }

    /// The `repo`/`branch` pair, extracted structurally. An opaque record
    /// whose auxiliary fields have the wrong types still yields its pair
    /// here, so migration keys off the two fields alone; a non-mapping
    /// value yields `None`.
    pub fn repo_branch(&self) -> Option<(&str, &str)> {
        match self {
            WorktreeRecord::Entry(entry) => Some((&entry.repo, &entry.branch)),
            WorktreeRecord::Other(value) => {
                let repo = value.get("repo")?.as_str()?;
                let branch = value.get("branch")?.as_str()?;
                Some((repo, branch))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorktreeEntry {
    pub repo: String,
    pub branch: String,
    #[serde(default)]
    pub pr: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Build the composite key indexing `worktrees`.
pub fn worktree_key(repo: &str, branch: &str) -> String {
    format!("{repo}{WORKTREE_KEY_DELIMITER}{branch}")
}

/// Handle to the config file. Callers construct one once (explicitly or
/// from the environment) and pass it down; there is no global state.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `$REPO_CLI_CONFIG` if set, else `~/.repo-cli/config.yaml`.
    pub fn from_env() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(Self::new(PathBuf::from(path)));
        }
        let home = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
        Ok(Self::new(home.join(".repo-cli").join("config.yaml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load, migrate to the current schema, and persist the migration if
    /// anything changed. This is the entry point every command uses.
    pub fn load(&self) -> Result<Config> {
        let mut config = self.load_raw()?;
        let rekeyed = migrate_config(&mut config);
        let moved = migrate_worktree_paths(&config);
        if rekeyed || moved {
            self.save(&config)?;
        }
        Ok(config)
    }

    /// Load the file as-is, without migration.
    pub fn load_raw(&self) -> Result<Config> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound(self.path.clone()));
            }
            Err(e) => return Err(Error::Io(e)),
        };
        if text.trim().is_empty() {
            return Err(Error::InvalidConfig("config file is empty".to_string()));
        }
        serde_yaml::from_str(&text).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Write via a temp file in the same directory, fsync, then rename,
    /// so a crash mid-write cannot corrupt the file the next load sees.
    pub fn save(&self, config: &Config) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::InvalidConfig(format!("config path has no parent directory: {}", self.path.display())))?;
        std::fs::create_dir_all(parent)?;
        let text = serde_yaml::to_string(config)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".config.")
            .suffix(".yaml.tmp")
            .tempfile_in(parent)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

/// Parse a git remote URL into an `owner/name` slug.
///
/// `Ok(Some(..))` for GitHub (`github.com` and `github.*` enterprise)
/// hosts, `Ok(None)` for other parseable git URLs (graceful degradation),
/// `Err(InvalidUrl)` for anything that is not a git URL at all.
pub fn parse_github_url(url: &str) -> Result<Option<String>> {
    let (host, path) = split_git_url(url).ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
    if host.is_empty() {
        return Err(Error::InvalidUrl(url.to_string()));
    }
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');
    let slug = match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
            format!("{owner}/{name}")
        }
        _ => return Err(Error::InvalidUrl(url.to_string())),
    };
    if host == "github.com" || host.starts_with("github.") {
        Ok(Some(slug))
    } else {
        Ok(None)
    }
}

fn split_git_url(url: &str) -> Option<(&str, &str)> {
    // scp-like: git@host:owner/repo.git
    if let Some(rest) = url.strip_prefix("git@") {
        return rest.split_once(':');
    }
    for scheme in ["https://", "http://", "ssh://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            let rest = rest.strip_prefix("git@").unwrap_or(rest);
            return rest.split_once('/');
        }
    }
    None
}

/// Migration pass 1: re-key worktree entries from the ambiguous legacy
/// `repo-branch` format to `repo::branch`.
///
/// Entries whose key already contains `::` are kept. Re-keying needs only
/// the `repo` and `branch` fields; a record whose other fields are
/// off-type still moves. Values without both fields are left under their
/// original key rather than guessed at. Returns whether anything was
/// re-keyed; only then is a missing `version` field set to the baseline.
pub fn migrate_config(config: &mut Config) -> bool {
    let Some(worktrees) = config.worktrees.as_mut() else {
        return false;
    };
    let mut changed = false;
    let mut rekeyed = BTreeMap::new();
    for (key, record) in std::mem::take(worktrees) {
        if key.contains(WORKTREE_KEY_DELIMITER) {
            rekeyed.insert(key, record);
            continue;
        }
        match record
            .repo_branch()
            .map(|(repo, branch)| worktree_key(repo, branch))
        {
            Some(new_key) => {
                rekeyed.insert(new_key, record);
                changed = true;
            }
            None => {
                rekeyed.insert(key, record);
            }
        }
    }
    *worktrees = rekeyed;
    if changed && config.version.is_none() {
        config.version = Some(CONFIG_SCHEMA_VERSION.to_string());
    }
    changed
}

/// Migration pass 2: relocate worktree directories from the legacy lossy
/// `/` -> `__` naming to the percent-encoded naming.
///
/// Runs against the filesystem only; the in-memory config is never
/// altered. Each entry is moved via `git worktree move` (which also
/// updates git's worktree bookkeeping) and only when the legacy directory
/// exists, the new one does not, and the bare repo is present. A failed
/// move leaves that entry unmigrated and the pass carries on: migration
/// must never block ordinary use of the tool. Returns whether at least
/// one directory actually moved.
pub fn migrate_worktree_paths(config: &Config) -> bool {
    let Some(base_dir) = config.base_dir.as_deref() else {
        return false;
    };
    let Ok(base_dir) = paths::expand_path(base_dir) else {
        return false;
    };
    let Some(worktrees) = config.worktrees.as_ref() else {
        return false;
    };
    let mut changed = false;
    for record in worktrees.values() {
        let Some((repo, branch)) = record.repo_branch() else {
            continue;
        };
        let legacy_name = format!("{}-{}", repo, branch.replace('/', "__"));
        let current_name = format!("{}-{}", repo, paths::encode_branch(branch));
        if legacy_name == current_name {
            continue;
        }
        let legacy_path = base_dir.join(&legacy_name);
        let current_path = base_dir.join(&current_name);
        let bare_path = base_dir.join(format!("{repo}.git"));
        if !legacy_path.exists() || current_path.exists() || !bare_path.exists() {
            continue;
        }
        if git_move_worktree(&bare_path, &legacy_path, &current_path) {
            changed = true;
        }
    }
    changed
}

/// Best-effort `git worktree move`; any spawn failure or non-zero exit is
/// reported as `false` and otherwise ignored.
fn git_move_worktree(bare_repo: &Path, from: &Path, to: &Path) -> bool {
    Command::new("git")
        .arg("-C")
        .arg(bare_repo)
        .args(["worktree", "move"])
        .arg(from)
        .arg(to)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
