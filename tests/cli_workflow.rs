mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

fn repo_cmd(config_path: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repo"));
    cmd.env("REPO_CLI_CONFIG", config_path);
    cmd
}

#[test]
fn init_creates_config_and_base_dir() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");
    let base = td.path().join("code");

    repo_cmd(&config)
        .args(["init", "--base-dir", base.to_str().unwrap()])
        .assert()
        .success();
    assert!(base.is_dir());
    let on_disk = fs::read_to_string(&config).unwrap();
    assert!(on_disk.contains("base_dir:"), "{on_disk}");

    repo_cmd(&config)
        .args(["init", "--base-dir", base.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("--force"));

    repo_cmd(&config)
        .args(["init", "--base-dir", base.to_str().unwrap(), "--force"])
        .assert()
        .success();
}

#[test]
fn register_records_alias_and_slug() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");
    let base = td.path().join("code");
    repo_cmd(&config)
        .args(["init", "--base-dir", base.to_str().unwrap()])
        .assert()
        .success();

    repo_cmd(&config)
        .args(["register", "app", "git@github.com:apache/superset.git"])
        .assert()
        .success()
        .stdout(contains("apache/superset"));
    let on_disk = fs::read_to_string(&config).unwrap();
    assert!(on_disk.contains("owner_repo: apache/superset"), "{on_disk}");

    repo_cmd(&config)
        .args(["register", "app", "git@github.com:other/repo.git"])
        .assert()
        .failure()
        .stderr(contains("--force"));

    repo_cmd(&config)
        .args(["register", "app", "git@github.com:other/repo.git", "--force"])
        .assert()
        .success();
}

#[test]
fn register_rejects_invalid_alias() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");

    repo_cmd(&config)
        .args(["register", "bad::alias", "git@github.com:a/b.git"])
        .assert()
        .failure()
        .stderr(contains("invalid repo alias"));
}

#[test]
fn register_rejects_garbage_url() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");

    repo_cmd(&config)
        .args(["register", "app", "not a url"])
        .assert()
        .failure()
        .stderr(contains("invalid git URL"));
}

#[test]
fn create_rejects_invalid_branch() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");

    repo_cmd(&config)
        .args(["create", "app", "bad branch"])
        .assert()
        .failure()
        .stderr(contains("invalid branch name"));
}

#[test]
fn create_without_git_in_path_hints_at_install() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");

    repo_cmd(&config)
        .env("PATH", "")
        .args(["create", "app", "main"])
        .assert()
        .failure()
        .stderr(contains("git not found in PATH"));
}

#[test]
fn create_unregistered_repo_fails_without_a_terminal() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");
    let base = td.path().join("code");
    repo_cmd(&config)
        .args(["init", "--base-dir", base.to_str().unwrap()])
        .assert()
        .success();

    repo_cmd(&config)
        .args(["create", "ghost", "main"])
        .assert()
        .failure()
        .stderr(contains("not registered"));
}

#[test]
fn create_list_activate_delete_roundtrip() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");
    let base = td.path().join("code");
    fs::create_dir_all(&base).unwrap();
    let src = td.path().join("src-repo");
    common::seed_source_repo(&src);
    common::seed_config(&config, &base, "app", src.to_str().unwrap());

    repo_cmd(&config)
        .args(["create", "app", "feature/login", "--from", "main"])
        .assert()
        .success()
        .stdout(contains("app-feature%2Flogin"));
    assert!(base.join("app.git").is_dir());
    assert!(base.join("app-feature%2Flogin").is_dir());
    let on_disk = fs::read_to_string(&config).unwrap();
    assert!(on_disk.contains("app::feature/login"), "{on_disk}");
    assert!(on_disk.contains("start_point: main"), "{on_disk}");

    repo_cmd(&config)
        .args(["list"])
        .assert()
        .success()
        .stdout(contains("REPO").and(contains("feature/login")));

    repo_cmd(&config)
        .args(["list", "other"])
        .assert()
        .success()
        .stdout(contains("No worktrees found for 'other'"));

    repo_cmd(&config)
        .args(["activate", "app", "feature/login", "--print"])
        .assert()
        .success()
        .stdout(contains("app-feature%2Flogin"));

    repo_cmd(&config)
        .args(["activate", "app", "feature/login"])
        .assert()
        .success()
        .stdout(contains("cd "));

    // Non-interactive delete requires --force.
    repo_cmd(&config)
        .args(["delete", "app", "feature/login"])
        .assert()
        .failure()
        .stderr(contains("--force"));

    repo_cmd(&config)
        .args(["delete", "app", "feature/login", "--force"])
        .assert()
        .success();
    assert!(!base.join("app-feature%2Flogin").exists());
    let on_disk = fs::read_to_string(&config).unwrap();
    assert!(!on_disk.contains("app::feature/login"), "{on_disk}");

    repo_cmd(&config)
        .args(["list"])
        .assert()
        .success()
        .stdout(contains("No worktrees found"));
}

#[test]
fn create_checks_out_an_existing_branch() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");
    let base = td.path().join("code");
    fs::create_dir_all(&base).unwrap();
    let src = td.path().join("src-repo");
    common::seed_source_repo(&src);
    common::run_git(&src, &["branch", "dev"]);
    common::seed_config(&config, &base, "app", src.to_str().unwrap());

    repo_cmd(&config)
        .args(["create", "app", "dev", "--from", "main"])
        .assert()
        .success()
        .stdout(contains("(existing)"));
}

#[cfg(unix)]
#[test]
fn pr_link_and_list_use_the_gh_cli() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");
    let base = td.path().join("code");
    fs::write(
        &config,
        format!(
            "base_dir: {}\n\
             repos:\n\
             \x20 app:\n\
             \x20   url: git@github.com:apache/superset.git\n\
             \x20   owner_repo: apache/superset\n\
             worktrees:\n\
             \x20 app::main:\n\
             \x20   repo: app\n\
             \x20   branch: main\n\
             \x20   pr: null\n",
            base.display()
        ),
    )
    .unwrap();

    let stub_bin = td.path().join("bin");
    fs::create_dir_all(&stub_bin).unwrap();
    common::stub_gh(&stub_bin, "MERGED");
    let path = common::prepend_path(&stub_bin);

    repo_cmd(&config)
        .env("PATH", &path)
        .args(["pr", "link", "app", "main", "42"])
        .assert()
        .success()
        .stdout(contains("Linked PR #42"));
    let on_disk = fs::read_to_string(&config).unwrap();
    assert!(on_disk.contains("pr: 42"), "{on_disk}");

    repo_cmd(&config)
        .env("PATH", &path)
        .args(["list"])
        .assert()
        .success()
        .stdout(contains("#42").and(contains("Merged")));
}

#[test]
fn pr_link_unknown_worktree_fails() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");
    fs::write(&config, "base_dir: /tmp/code\n").unwrap();

    repo_cmd(&config)
        .args(["pr", "link", "app", "main", "42"])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn activate_missing_directory_fails() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");
    let base = td.path().join("code");
    fs::create_dir_all(&base).unwrap();
    fs::write(
        &config,
        format!(
            "base_dir: {}\n\
             worktrees:\n\
             \x20 app::main:\n\
             \x20   repo: app\n\
             \x20   branch: main\n\
             \x20   pr: null\n",
            base.display()
        ),
    )
    .unwrap();

    repo_cmd(&config)
        .args(["activate", "app", "main"])
        .assert()
        .failure()
        .stderr(contains("missing"));
}

#[test]
fn commands_hint_at_init_when_config_is_missing() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");

    repo_cmd(&config)
        .args(["list"])
        .assert()
        .failure()
        .stderr(contains("repo init"));
}

#[test]
fn doctor_reports_without_failing() {
    let td = TempDir::new().unwrap();
    let config = td.path().join("config.yaml");

    repo_cmd(&config)
        .args(["doctor"])
        .assert()
        .success()
        .stdout(contains("repo-cli doctor").and(contains("git")));
}
