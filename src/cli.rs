use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands;

#[derive(Parser, Debug)]
#[command(
    name = "repo",
    version,
    about = "Manage git worktrees across repositories, with PR tracking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize the config file and base directory
    Init(InitArgs),
    /// Register a repository alias for easy reference
    Register(RegisterArgs),
    /// Create a new worktree for a branch
    Create(CreateArgs),
    /// Display all worktrees with PR status
    List(ListArgs),
    /// Remove a worktree
    Delete(DeleteArgs),
    /// Print the path to a worktree for navigation
    Activate(ActivateArgs),
    /// Manage pull requests
    Pr(PrArgs),
    /// Run diagnostic checks on the installation
    Doctor,
}

#[derive(Args, Debug)]
pub(crate) struct InitArgs {
    /// Base directory for bare repositories and worktrees
    #[arg(long, default_value = "~/code")]
    pub(crate) base_dir: String,
    /// Overwrite an existing config
    #[arg(long)]
    pub(crate) force: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RegisterArgs {
    /// Repository alias (short name, e.g. `superset`)
    pub(crate) alias: String,
    /// Remote URL (SSH or HTTPS)
    pub(crate) url: String,
    /// Overwrite an existing alias
    #[arg(long)]
    pub(crate) force: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CreateArgs {
    /// Repository alias
    pub(crate) repo: String,
    /// Branch name to create/check out (can include `/`, e.g. `feature/JIRA-123`)
    pub(crate) branch: String,
    /// Start point (branch, tag, or commit); defaults to origin/HEAD
    #[arg(long = "from")]
    pub(crate) from_ref: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Only show worktrees for this repository alias
    pub(crate) repo: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct DeleteArgs {
    /// Repository alias
    pub(crate) repo: String,
    /// Branch name
    pub(crate) branch: String,
    /// Skip confirmation
    #[arg(long)]
    pub(crate) force: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ActivateArgs {
    /// Repository alias
    pub(crate) repo: String,
    /// Branch name
    pub(crate) branch: String,
    /// Print the bare path only (for `cd $(repo activate ... --print)`)
    #[arg(long = "print", short = 'p')]
    pub(crate) print_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PrArgs {
    #[command(subcommand)]
    command: PrCommands,
}

#[derive(Subcommand, Debug)]
enum PrCommands {
    /// Link a PR number to a worktree
    Link(PrLinkArgs),
}

#[derive(Args, Debug)]
pub(crate) struct PrLinkArgs {
    /// Repository alias
    pub(crate) repo: String,
    /// Branch name
    pub(crate) branch: String,
    /// Pull request number
    pub(crate) pr_number: u64,
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => commands::setup::cmd_init(args),
        Commands::Register(args) => commands::setup::cmd_register(args),
        Commands::Create(args) => commands::worktree::cmd_create(args),
        Commands::List(args) => commands::worktree::cmd_list(args),
        Commands::Delete(args) => commands::worktree::cmd_delete(args),
        Commands::Activate(args) => commands::worktree::cmd_activate(args),
        Commands::Pr(args) => match args.command {
            PrCommands::Link(a) => commands::pr::cmd_pr_link(a),
        },
        Commands::Doctor => commands::doctor::cmd_doctor(),
    }
}
