use std::path::Path;
use std::process::{Command, Output};

use anyhow::{bail, Context, Result};

/// Run a git invocation, capturing output; non-zero exit becomes an error
/// carrying git's own stderr.
fn run_captured(mut cmd: Command, action: &str) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("Failed to run {action}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{action} failed: {}", stderr.trim());
    }
    Ok(output)
}

/// Clone `url` as a bare repository at `target`. Clones can be long, so
/// stdio is inherited and git's progress meter streams to the terminal.
pub(crate) fn clone_bare(url: &str, target: &Path) -> Result<()> {
    let status = Command::new("git")
        .args(["clone", "--bare", url])
        .arg(target)
        .status()
        .context("Failed to run git clone")?;
    if !status.success() {
        bail!("git clone --bare failed with {status}");
    }
    Ok(())
}

/// Fetch the default remote of a bare repository so new remote branches
/// become visible.
pub(crate) fn fetch(bare_repo: &Path) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(bare_repo).arg("fetch");
    run_captured(cmd, "git fetch")?;
    Ok(())
}

fn ref_exists(bare_repo: &Path, ref_name: &str) -> bool {
    Command::new("git")
        .arg("-C")
        .arg(bare_repo)
        .args(["show-ref", "--verify", "--quiet", ref_name])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Create a worktree for `branch` under the bare repository.
///
/// If the branch already exists (locally, or on the remote) it is checked
/// out as-is; otherwise a new branch is created from `start_point`.
/// Returns the ref actually used and whether a new branch was created.
pub(crate) fn create_worktree(
    bare_repo: &Path,
    worktree_dir: &Path,
    branch: &str,
    start_point: &str,
) -> Result<(String, bool)> {
    let local_ref = format!("refs/heads/{branch}");
    let remote_ref = format!("refs/remotes/origin/{branch}");

    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(bare_repo).args(["worktree", "add"]);
    let (actual_ref, is_new_branch) = if ref_exists(bare_repo, &local_ref) {
        cmd.arg(worktree_dir).arg(branch);
        (branch.to_string(), false)
    } else if ref_exists(bare_repo, &remote_ref) {
        // git sets up tracking for a lone matching remote branch.
        cmd.arg(worktree_dir).arg(branch);
        (format!("origin/{branch}"), false)
    } else {
        cmd.arg(worktree_dir).args(["-b", branch, start_point]);
        (start_point.to_string(), true)
    };

    run_captured(cmd, "git worktree add")?;
    Ok((actual_ref, is_new_branch))
}

/// Remove a worktree through the bare repository, updating git's worktree
/// bookkeeping along with the directory.
pub(crate) fn remove_worktree(bare_repo: &Path, worktree_dir: &Path) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(bare_repo)
        .args(["worktree", "remove"])
        .arg(worktree_dir);
    run_captured(cmd, "git worktree remove")?;
    Ok(())
}

/// Initialize submodules recursively; returns how many were registered.
pub(crate) fn init_submodules(worktree_dir: &Path) -> Result<usize> {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(worktree_dir)
        .args(["submodule", "update", "--init", "--recursive"]);
    let output = run_captured(cmd, "git submodule update")?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .filter(|line| line.starts_with("Submodule"))
        .count())
}

pub(crate) fn get_remote_url(bare_repo: &Path) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(bare_repo)
        .args(["remote", "get-url", "origin"]);
    let output = run_captured(cmd, "git remote get-url")?;
    let url = String::from_utf8(output.stdout).context("git output not utf8")?;
    Ok(url.trim().to_string())
}

pub(crate) fn set_remote_url(bare_repo: &Path, url: &str) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(bare_repo)
        .args(["remote", "set-url", "origin", url]);
    run_captured(cmd, "git remote set-url")?;
    Ok(())
}

/// `git --version` output, e.g. "git version 2.43.0".
pub(crate) fn version() -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.arg("--version");
    let output = run_captured(cmd, "git --version")?;
    let text = String::from_utf8(output.stdout).context("git output not utf8")?;
    Ok(text.trim().to_string())
}
