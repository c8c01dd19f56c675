#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub fn run_git(dir: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .current_dir(dir)
        .args(args)
        .status()
        .expect("spawn git");
    assert!(status.success(), "git {:?} failed", args);
}

/// A source repository with one commit on `main`, to clone bare from.
pub fn seed_source_repo(repo: &Path) {
    fs::create_dir_all(repo).unwrap();
    run_git(repo, &["init", "-b", "main"]);
    fs::write(repo.join("README.md"), "hello\n").unwrap();
    run_git(repo, &["add", "-A"]);
    run_git(
        repo,
        &[
            "-c",
            "user.name=repo-test",
            "-c",
            "user.email=repo-test@example.com",
            "commit",
            "-m",
            "init",
        ],
    );
}

/// Bare clone of `src` at `base/{alias}.git` — the layout `repo create`
/// produces on first use.
pub fn seed_bare_clone(base: &Path, alias: &str, src: &Path) -> PathBuf {
    let bare = base.join(format!("{alias}.git"));
    let status = StdCommand::new("git")
        .args(["clone", "--bare"])
        .arg(src)
        .arg(&bare)
        .status()
        .expect("spawn git");
    assert!(status.success(), "bare clone failed");
    bare
}

/// Minimal config file: a base directory and one registered repo.
pub fn seed_config(config_path: &Path, base: &Path, alias: &str, url: &str) {
    fs::write(
        config_path,
        format!(
            "base_dir: {}\n\
             repos:\n\
             \x20 {alias}:\n\
             \x20   url: {url}\n",
            base.display()
        ),
    )
    .unwrap();
}

/// A fake `gh` answering the `--version` probe and returning `state` for
/// every `pr view` call.
#[cfg(unix)]
pub fn stub_gh(dir: &Path, state: &str) -> PathBuf {
    let path = dir.join("gh");
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"--version\" ]; then echo 'gh version 2.0.0'; exit 0; fi\n\
         echo '{{\"state\":\"{state}\"}}'\n"
    );
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

pub fn prepend_path(stub_bin: &Path) -> String {
    let old = std::env::var("PATH").unwrap_or_default();
    format!("{}:{}", stub_bin.display(), old)
}
