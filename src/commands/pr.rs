use anyhow::{bail, Result};

use repo_cli::config::{worktree_key, ConfigStore, WorktreeRecord};

use crate::cli::PrLinkArgs;
use crate::gh;

pub(crate) fn cmd_pr_link(args: PrLinkArgs) -> Result<()> {
    let store = ConfigStore::from_env()?;
    let mut config = super::load_config(&store)?;

    let key = worktree_key(&args.repo, &args.branch);
    let owner_repo = config
        .repos
        .as_ref()
        .and_then(|repos| repos.get(&args.repo))
        .and_then(|repo| repo.owner_repo.clone());

    let Some(record) = config.worktrees.as_mut().and_then(|w| w.get_mut(&key)) else {
        bail!("Worktree '{}/{}' not found", args.repo, args.branch);
    };
    let WorktreeRecord::Entry(entry) = record else {
        bail!(
            "Worktree entry for '{}/{}' is malformed; fix the config before linking a PR",
            args.repo,
            args.branch
        );
    };

    // Validation is best-effort: the link goes through even when gh can't
    // confirm the PR.
    if let Some(slug) = &owner_repo {
        if gh::is_gh_available() {
            if gh::validate_pr_exists(args.pr_number, slug) {
                let status = gh::get_pr_status(args.pr_number, slug)
                    .unwrap_or_else(|| "unknown".to_string());
                println!("PR #{} in {slug}: {status}", args.pr_number);
            } else {
                eprintln!(
                    "Warning: could not find PR #{} in {slug}; linking anyway",
                    args.pr_number
                );
            }
        }
    }

    entry.pr = Some(args.pr_number);
    store.save(&config)?;
    println!("Linked PR #{} to {}/{}", args.pr_number, args.repo, args.branch);
    Ok(())
}
