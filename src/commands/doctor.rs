use std::fs;

use anyhow::Result;

use repo_cli::config::ConfigStore;
use repo_cli::errors::Error;
use repo_cli::paths;

use crate::{gh, git};

pub(crate) fn cmd_doctor() -> Result<()> {
    println!("repo-cli doctor");
    println!();
    let mut all_ok = true;

    println!("1. git");
    match git::version() {
        Ok(version) => {
            println!("   ok: {version}");
            if let Some((major, minor)) = parse_git_version(&version) {
                if (major, minor) < (2, 17) {
                    println!("   warning: git 2.17+ is required for worktree move, found {major}.{minor}");
                    all_ok = false;
                }
            }
        }
        Err(_) => {
            println!("   error: git not found in PATH");
            all_ok = false;
        }
    }

    println!("2. gh CLI");
    if gh::is_gh_available() {
        println!("   ok: gh found");
    } else {
        println!("   warning: gh not found; PR status will show as '-'");
    }

    println!("3. configuration");
    let store = ConfigStore::from_env()?;
    match store.load() {
        Ok(config) => {
            println!("   ok: config at {}", store.path().display());
            match config.base_dir.as_deref() {
                None => {
                    println!("   warning: base_dir not configured");
                    all_ok = false;
                }
                Some(base) => match paths::expand_path(base) {
                    Ok(base_dir) if base_dir.is_dir() => {
                        println!("   ok: base directory {}", base_dir.display());
                        let probe = base_dir.join(".repo-cli-test");
                        match fs::write(&probe, b"") {
                            Ok(()) => {
                                let _ = fs::remove_file(&probe);
                                println!("   ok: base directory is writable");
                            }
                            Err(e) => {
                                println!("   error: base directory not writable: {e}");
                                all_ok = false;
                            }
                        }
                    }
                    Ok(base_dir) => {
                        println!("   warning: base directory missing: {}", base_dir.display());
                        all_ok = false;
                    }
                    Err(e) => {
                        println!("   error: {e}");
                        all_ok = false;
                    }
                },
            }
        }
        Err(Error::ConfigNotFound(path)) => {
            println!("   warning: no config at {}. Run 'repo init'", path.display());
            all_ok = false;
        }
        Err(e) => {
            println!("   error: {e}");
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All checks passed.");
    } else {
        println!("Some checks need attention:");
        println!("  - git: https://git-scm.com/downloads");
        println!("  - gh:  https://cli.github.com/");
        println!("  - config: repo init --base-dir ~/code");
    }
    Ok(())
}

fn parse_git_version(text: &str) -> Option<(u32, u32)> {
    // "git version 2.43.0" (possibly with a platform suffix)
    let number = text.split_whitespace().nth(2)?;
    let mut parts = number.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
