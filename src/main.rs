mod cli;
mod commands;
mod exec;
mod gh;
mod git;

fn main() -> anyhow::Result<()> {
    crate::cli::run()
}
