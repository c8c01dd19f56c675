//! Identifier validation and filesystem path derivation.
//!
//! Repo aliases and branch names come straight from user input and end up
//! both in worktree keys and on disk, so this module is the choke point
//! that keeps path traversal and key collisions out of the rest of the
//! program.

use std::path::{Component, Path, PathBuf};

use crate::errors::{Error, Result};

/// Characters git prohibits anywhere in a ref name, plus space.
const PROHIBITED_BRANCH_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

/// Accepts `[A-Za-z0-9._-]+`, rejecting `::` (worktree-key delimiter) and
/// dot-only names (`.`, `..`, ...). Acceptance is the only signal.
pub fn validate_repo_alias(alias: &str) -> Result<()> {
    if alias.is_empty() {
        return Err(Error::invalid_alias(alias, "alias is empty"));
    }
    if alias.contains("::") {
        return Err(Error::invalid_alias(alias, "alias cannot contain '::'"));
    }
    if !alias
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
    {
        return Err(Error::invalid_alias(
            alias,
            "alias may only contain [A-Za-z0-9._-]",
        ));
    }
    if alias.bytes().all(|b| b == b'.') {
        return Err(Error::invalid_alias(
            alias,
            "alias cannot consist only of dots",
        ));
    }
    Ok(())
}

/// Accepts everything `git check-ref-format` accepts for a branch, and
/// additionally rejects `__` (reserved by the legacy directory encoding).
/// Checked in priority order; the first failure wins.
pub fn validate_branch_name(branch: &str) -> Result<()> {
    if branch.is_empty() {
        return Err(Error::invalid_branch(branch, "branch name is empty"));
    }
    if branch
        .chars()
        .any(|c| c.is_ascii_control() || PROHIBITED_BRANCH_CHARS.contains(&c))
    {
        return Err(Error::invalid_branch(
            branch,
            "branch name contains prohibited characters",
        ));
    }
    if branch == "@" {
        return Err(Error::invalid_branch(
            branch,
            "branch name cannot be a single '@'",
        ));
    }
    if branch.contains("@{") {
        return Err(Error::invalid_branch(
            branch,
            "branch name cannot contain '@{'",
        ));
    }
    if branch.contains("..") {
        return Err(Error::invalid_branch(
            branch,
            "branch name cannot contain '..'",
        ));
    }
    if branch.ends_with('.') {
        return Err(Error::invalid_branch(
            branch,
            "branch name cannot end with '.'",
        ));
    }
    if branch.starts_with('/') || branch.ends_with('/') {
        return Err(Error::invalid_branch(
            branch,
            "branch name cannot start or end with '/'",
        ));
    }
    if branch.contains("//") {
        return Err(Error::invalid_branch(
            branch,
            "branch name cannot contain consecutive slashes",
        ));
    }
    for component in branch.split('/') {
        if component.starts_with('.') {
            return Err(Error::invalid_branch(
                branch,
                "branch name components cannot start with '.'",
            ));
        }
        if component.ends_with(".lock") {
            return Err(Error::invalid_branch(
                branch,
                "branch name components cannot end with '.lock'",
            ));
        }
    }
    if branch.contains("__") {
        return Err(Error::invalid_branch(
            branch,
            "branch name cannot contain '__'",
        ));
    }
    Ok(())
}

/// Percent-encode a branch name into a single path segment.
///
/// Escapes every character outside the RFC 3986 unreserved set, `%`
/// included, so the mapping is a bijection: distinct branches never share
/// a directory and the branch is always recoverable from the segment.
pub fn encode_branch(branch: &str) -> String {
    urlencoding::encode(branch).into_owned()
}

/// Inverse of [`encode_branch`].
pub fn decode_branch(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|_| Error::invalid_branch(segment, "segment is not valid percent-encoded UTF-8"))
}

/// Fail with `PathEscape` unless `path` resolves to `base_dir` or a
/// descendant of it.
///
/// Both sides are resolved through the filesystem (symlinks followed)
/// before comparison, so a symlink inside the base pointing elsewhere is
/// caught. `path` need not exist: only the deepest existing ancestor is
/// resolved and the remaining components are appended as-is.
pub fn validate_path_safety(path: &Path, base_dir: &Path) -> Result<()> {
    let resolved_base = resolve_existing_prefix(base_dir)?;
    let resolved = resolve_existing_prefix(path)?;
    if resolved.starts_with(&resolved_base) {
        Ok(())
    } else {
        Err(Error::PathEscape {
            path: resolved,
            base: resolved_base,
        })
    }
}

/// Path to the bare repository backing `repo`: `{base_dir}/{repo}.git`.
pub fn get_bare_repo_path(base_dir: &Path, repo: &str) -> Result<PathBuf> {
    validate_repo_alias(repo)?;
    let path = base_dir.join(format!("{repo}.git"));
    validate_path_safety(&path, base_dir)?;
    Ok(path)
}

/// Path to the worktree for (`repo`, `branch`):
/// `{base_dir}/{repo}-{percent_encoded_branch}`.
pub fn get_worktree_path(base_dir: &Path, repo: &str, branch: &str) -> Result<PathBuf> {
    validate_repo_alias(repo)?;
    validate_branch_name(branch)?;
    let path = base_dir.join(format!("{repo}-{}", encode_branch(branch)));
    validate_path_safety(&path, base_dir)?;
    Ok(path)
}

/// Expand `~` and make the path absolute (lexically normalized, no
/// filesystem access beyond the current directory lookup).
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = if path == "~" {
        dirs::home_dir().ok_or(Error::HomeDirUnavailable)?
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().ok_or(Error::HomeDirUnavailable)?.join(rest)
    } else {
        PathBuf::from(path)
    };
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    Ok(lexical_normalize(&absolute))
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the
/// components below it, so candidates that do not exist yet can still be
/// checked for containment.
fn resolve_existing_prefix(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut existing = lexical_normalize(&absolute);
    let mut tail: Vec<std::ffi::OsString> = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(resolved) => {
                let mut out = resolved;
                for name in tail.iter().rev() {
                    out.push(name);
                }
                return Ok(out);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match (existing.file_name(), existing.parent()) {
                    (Some(name), Some(parent)) => {
                        tail.push(name.to_os_string());
                        existing = parent.to_path_buf();
                    }
                    _ => return Err(Error::Io(e)),
                }
            }
            Err(e) => return Err(Error::Io(e)),
        }
    }
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
