use std::collections::BTreeMap;
use std::fs;

use anyhow::{bail, Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

use repo_cli::config::{parse_github_url, Config, ConfigStore, RepoEntry};
use repo_cli::paths;

use crate::cli::{InitArgs, RegisterArgs};
use crate::{exec, git};

pub(crate) fn cmd_init(args: InitArgs) -> Result<()> {
    let store = ConfigStore::from_env()?;
    if store.exists() && !args.force {
        bail!(
            "Config already exists at {}. Use --force to overwrite.",
            store.path().display()
        );
    }

    let base_dir = paths::expand_path(&args.base_dir)?;
    fs::create_dir_all(&base_dir)
        .with_context(|| format!("Failed to create base directory {}", base_dir.display()))?;

    let config = Config {
        base_dir: Some(base_dir.display().to_string()),
        repos: Some(BTreeMap::new()),
        worktrees: Some(BTreeMap::new()),
        version: None,
    };
    store.save(&config)?;

    println!("Created config at {}", store.path().display());
    println!("Base directory: {}", base_dir.display());
    println!();
    println!("Next: register a repository with 'repo register <alias> <url>'");
    Ok(())
}

pub(crate) fn cmd_register(args: RegisterArgs) -> Result<()> {
    paths::validate_repo_alias(&args.alias)?;
    let owner_repo = parse_github_url(&args.url)?;

    let store = ConfigStore::from_env()?;
    let mut config = super::load_config(&store)?;

    let existing_url = config
        .repos
        .as_ref()
        .and_then(|repos| repos.get(&args.alias))
        .map(|entry| entry.url.clone());
    if let Some(old_url) = &existing_url {
        if !args.force {
            bail!(
                "Alias '{}' is already registered to {}. Use --force to overwrite.",
                args.alias,
                old_url
            );
        }
        println!("Overwriting alias '{}' (was {})", args.alias, old_url);
    }

    // A bare repo may already exist under this alias from a previous
    // registration; reconcile its origin URL with the new one.
    if let Some(base_dir) = config.base_dir.as_deref() {
        let base_dir = paths::expand_path(base_dir)?;
        let bare_repo = paths::get_bare_repo_path(&base_dir, &args.alias)?;
        if bare_repo.exists() {
            match git::get_remote_url(&bare_repo) {
                Ok(current) if current != args.url => {
                    println!("Bare repository remote URL differs:");
                    println!("  current: {current}");
                    println!("  new:     {}", args.url);
                    let update = if exec::can_prompt() {
                        Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt("Update the bare repository remote URL?")
                            .default(true)
                            .interact()
                            .context("Prompt failed")?
                    } else {
                        false
                    };
                    if update {
                        git::set_remote_url(&bare_repo, &args.url)?;
                        println!("Updated remote URL");
                    } else {
                        eprintln!("Warning: remote URL left unchanged; fetches will still use {current}");
                    }
                }
                Ok(_) => {}
                Err(e) => eprintln!("Warning: could not inspect bare repository remote: {e:#}"),
            }
        }
    }

    config.repos.get_or_insert_with(BTreeMap::new).insert(
        args.alias.clone(),
        RepoEntry {
            url: args.url.clone(),
            owner_repo: owner_repo.clone(),
            extra: BTreeMap::new(),
        },
    );
    store.save(&config)?;

    println!("Registered '{}' -> {}", args.alias, args.url);
    match owner_repo {
        Some(slug) => println!("GitHub repository: {slug}"),
        None => println!("Not a GitHub URL; PR status will not be available"),
    }
    Ok(())
}
