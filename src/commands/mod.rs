pub(crate) mod doctor;
pub(crate) mod pr;
pub(crate) mod setup;
pub(crate) mod worktree;

use anyhow::Result;

use repo_cli::config::{Config, ConfigStore};
use repo_cli::errors::Error;

/// Load (and migrate) the config, turning a missing file into a hint to
/// run `repo init`.
pub(crate) fn load_config(store: &ConfigStore) -> Result<Config> {
    store.load().map_err(|e| match e {
        Error::ConfigNotFound(path) => anyhow::anyhow!(
            "Config not found at {}. Run 'repo init' first",
            path.display()
        ),
        other => other.into(),
    })
}
