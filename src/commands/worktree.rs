use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use repo_cli::config::{
    parse_github_url, worktree_key, ConfigStore, RepoEntry, WorktreeEntry, WorktreeRecord,
};
use repo_cli::paths;

use crate::cli::{ActivateArgs, CreateArgs, DeleteArgs, ListArgs};
use crate::{exec, gh, git};

pub(crate) fn cmd_create(args: CreateArgs) -> Result<()> {
    exec::ensure_git()?;
    paths::validate_repo_alias(&args.repo)?;
    paths::validate_branch_name(&args.branch)?;

    let store = ConfigStore::from_env()?;
    let mut config = super::load_config(&store)?;
    let base_dir = config
        .base_dir
        .clone()
        .ok_or_else(|| anyhow!("base_dir not configured. Run 'repo init' first"))?;
    let base_dir = paths::expand_path(&base_dir)?;

    // Unknown aliases can be registered on the spot when a terminal is
    // attached.
    let registered = config
        .repos
        .as_ref()
        .is_some_and(|repos| repos.contains_key(&args.repo));
    if !registered {
        if !exec::can_prompt() {
            bail!(
                "Repository '{}' is not registered. Run 'repo register {} <url>' first",
                args.repo,
                args.repo
            );
        }
        println!("Repository '{}' is not registered.", args.repo);
        let url: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Repository URL")
            .interact_text()
            .context("Prompt failed")?;
        let owner_repo = parse_github_url(&url)?;
        config.repos.get_or_insert_with(BTreeMap::new).insert(
            args.repo.clone(),
            RepoEntry {
                url: url.clone(),
                owner_repo,
                extra: BTreeMap::new(),
            },
        );
        store.save(&config)?;
        println!("Registered '{}' -> {url}", args.repo);
    }

    let repo_url = config
        .repos
        .as_ref()
        .and_then(|repos| repos.get(&args.repo))
        .map(|entry| entry.url.clone())
        .ok_or_else(|| anyhow!("Repository '{}' is not registered", args.repo))?;

    let bare_repo = paths::get_bare_repo_path(&base_dir, &args.repo)?;
    let worktree_dir = paths::get_worktree_path(&base_dir, &args.repo, &args.branch)?;

    if !bare_repo.exists() {
        println!("Cloning {} (bare)...", args.repo);
        git::clone_bare(&repo_url, &bare_repo)?;
    } else if let Err(e) = git::fetch(&bare_repo) {
        eprintln!("Warning: fetch failed, branch information may be stale: {e:#}");
        if exec::can_prompt() {
            let proceed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Continue anyway?")
                .default(false)
                .interact()
                .context("Prompt failed")?;
            if !proceed {
                println!("Cancelled");
                return Ok(());
            }
        }
    }

    let start_point = args
        .from_ref
        .clone()
        .unwrap_or_else(|| "origin/HEAD".to_string());
    let (actual_ref, is_new_branch) =
        git::create_worktree(&bare_repo, &worktree_dir, &args.branch, &start_point)?;

    println!("Created worktree: {}", worktree_dir.display());
    if is_new_branch {
        println!("Branch: {} (new, from {actual_ref})", args.branch);
    } else {
        println!("Branch: {} (existing)", args.branch);
    }

    if worktree_dir.join(".gitmodules").exists() {
        println!("Initializing submodules...");
        match git::init_submodules(&worktree_dir) {
            Ok(count) if count > 0 => println!("Initialized {count} submodule(s)"),
            Ok(_) => {}
            Err(e) => eprintln!("Warning: submodule init failed: {e:#}"),
        }
    }

    let entry = WorktreeEntry {
        repo: args.repo.clone(),
        branch: args.branch.clone(),
        pr: None,
        start_point: Some(actual_ref),
        created_at: Some(Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
        extra: BTreeMap::new(),
    };
    config
        .worktrees
        .get_or_insert_with(BTreeMap::new)
        .insert(worktree_key(&args.repo, &args.branch), WorktreeRecord::Entry(entry));
    store.save(&config)?;

    println!();
    println!("  cd {}", worktree_dir.display());
    println!();
    Ok(())
}

pub(crate) fn cmd_list(args: ListArgs) -> Result<()> {
    let store = ConfigStore::from_env()?;
    let config = super::load_config(&store)?;

    let worktrees = config.worktrees.as_ref();
    if worktrees.is_none_or(|w| w.is_empty()) {
        println!("No worktrees found. Create one with 'repo create <repo> <branch>'");
        return Ok(());
    }

    let mut rows: Vec<[String; 4]> = Vec::new();
    for record in worktrees.into_iter().flat_map(|w| w.values()) {
        let Some(entry) = record.as_entry() else {
            continue;
        };
        if let Some(filter) = &args.repo {
            if &entry.repo != filter {
                continue;
            }
        }
        let (pr_cell, status_cell) = match entry.pr {
            Some(number) => {
                let slug = config
                    .repos
                    .as_ref()
                    .and_then(|repos| repos.get(&entry.repo))
                    .and_then(|repo| repo.owner_repo.clone());
                let status = slug.and_then(|slug| gh::get_pr_status(number, &slug));
                (format!("#{number}"), status.unwrap_or_else(|| "-".to_string()))
            }
            None => ("-".to_string(), "-".to_string()),
        };
        rows.push([entry.repo.clone(), entry.branch.clone(), pr_cell, status_cell]);
    }

    if rows.is_empty() {
        match &args.repo {
            Some(filter) => println!("No worktrees found for '{filter}'"),
            None => println!("No worktrees found. Create one with 'repo create <repo> <branch>'"),
        }
        return Ok(());
    }

    let header = ["REPO", "BRANCH", "PR", "STATUS"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }
    let print_row = |cells: [&str; 4]| {
        println!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {}",
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
    };
    print_row(header);
    for row in &rows {
        print_row([&row[0], &row[1], &row[2], &row[3]]);
    }
    Ok(())
}

pub(crate) fn cmd_delete(args: DeleteArgs) -> Result<()> {
    exec::ensure_git()?;

    let store = ConfigStore::from_env()?;
    let mut config = super::load_config(&store)?;
    let base_dir = config
        .base_dir
        .clone()
        .ok_or_else(|| anyhow!("base_dir not configured. Run 'repo init' first"))?;
    let base_dir = paths::expand_path(&base_dir)?;

    let key = worktree_key(&args.repo, &args.branch);
    if !config
        .worktrees
        .as_ref()
        .is_some_and(|w| w.contains_key(&key))
    {
        bail!("Worktree '{}/{}' not found", args.repo, args.branch);
    }

    if !args.force {
        if !exec::can_prompt() {
            bail!("Refusing to delete without confirmation; re-run with --force");
        }
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete worktree '{}/{}'?", args.repo, args.branch))
            .default(false)
            .interact()
            .context("Prompt failed")?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    let bare_repo = paths::get_bare_repo_path(&base_dir, &args.repo)?;
    let worktree_dir = paths::get_worktree_path(&base_dir, &args.repo, &args.branch)?;
    git::remove_worktree(&bare_repo, &worktree_dir)?;

    if let Some(worktrees) = config.worktrees.as_mut() {
        worktrees.remove(&key);
    }
    store.save(&config)?;
    println!("Removed worktree: {}", worktree_dir.display());
    Ok(())
}

pub(crate) fn cmd_activate(args: ActivateArgs) -> Result<()> {
    let store = ConfigStore::from_env()?;
    let config = super::load_config(&store)?;
    let base_dir = config
        .base_dir
        .clone()
        .ok_or_else(|| anyhow!("base_dir not configured. Run 'repo init' first"))?;
    let base_dir = paths::expand_path(&base_dir)?;

    let key = worktree_key(&args.repo, &args.branch);
    if !config
        .worktrees
        .as_ref()
        .is_some_and(|w| w.contains_key(&key))
    {
        bail!("Worktree '{}/{}' not found", args.repo, args.branch);
    }

    let worktree_dir = paths::get_worktree_path(&base_dir, &args.repo, &args.branch)?;
    if !worktree_dir.exists() {
        bail!(
            "Worktree directory missing: {}. It may have been removed outside repo-cli",
            worktree_dir.display()
        );
    }

    if args.print_only {
        println!("{}", worktree_dir.display());
    } else {
        println!("Worktree path:");
        println!();
        println!("  cd {}", worktree_dir.display());
        println!();
    }
    Ok(())
}
