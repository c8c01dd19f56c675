use std::process::Command;

use crate::exec;

/// PR features degrade gracefully when `gh` is missing or unauthenticated;
/// every failure mode here collapses to "status unknown".
pub(crate) fn is_gh_available() -> bool {
    exec::is_in_path("gh")
}

/// Look up a PR's state ("Open", "Merged", "Closed") via the gh CLI.
/// Returns `None` when gh is unavailable or the lookup fails.
pub(crate) fn get_pr_status(pr_number: u64, owner_repo: &str) -> Option<String> {
    if !is_gh_available() {
        return None;
    }
    let output = Command::new("gh")
        .args([
            "pr",
            "view",
            &pr_number.to_string(),
            "--repo",
            owner_repo,
            "--json",
            "state",
        ])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
    let state = payload.get("state")?.as_str()?;
    Some(title_case(state))
}

/// Whether the PR exists at all (false when gh is unavailable).
pub(crate) fn validate_pr_exists(pr_number: u64, owner_repo: &str) -> bool {
    if !is_gh_available() {
        return false;
    }
    Command::new("gh")
        .args(["pr", "view", &pr_number.to_string(), "--repo", owner_repo])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn title_case(state: &str) -> String {
    let mut chars = state.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
