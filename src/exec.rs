//! Probes for the two external binaries this tool drives, and TTY
//! detection for the interactive prompts.

use std::io::IsTerminal;
use std::process::{Command, Stdio};

use anyhow::{bail, Result};

/// Fail up front with an install hint instead of surfacing a spawn error
/// halfway through a clone or delete.
pub(crate) fn ensure_git() -> Result<()> {
    if is_in_path("git") {
        Ok(())
    } else {
        bail!("git not found in PATH (install: https://git-scm.com/downloads)");
    }
}

/// `<bin> --version` probe. Both git and gh support it and exit zero.
pub(crate) fn is_in_path(bin: &str) -> bool {
    Command::new(bin)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Prompts are only offered when both ends of the terminal are real;
/// scripted runs take the --force or error path instead of hanging.
pub(crate) fn can_prompt() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}
