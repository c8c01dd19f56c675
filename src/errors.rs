use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the validation, path-derivation and config layers.
///
/// Validation and path-safety failures propagate straight to the caller;
/// there is no local recovery. Migration-internal failures never show up
/// here (see `config::migrate_worktree_paths`).
#[derive(Debug, Error)]
pub enum Error {
    /// A repo alias or branch name failed its grammar.
    #[error("{reason}: {value:?}")]
    InvalidIdentifier { value: String, reason: String },

    /// A derived path would land outside the configured base directory.
    #[error("path is outside base directory: {} (base: {})", path.display(), base.display())]
    PathEscape { path: PathBuf, base: PathBuf },

    /// A remote URL that is not a parseable git URL.
    #[error("invalid git URL format: {0:?}")]
    InvalidUrl(String),

    #[error("config not found at {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("could not determine home directory")]
    HomeDirUnavailable,

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_alias(alias: &str, reason: impl Into<String>) -> Self {
        Error::InvalidIdentifier {
            value: alias.to_string(),
            reason: format!("invalid repo alias: {}", reason.into()),
        }
    }

    pub(crate) fn invalid_branch(branch: &str, reason: impl Into<String>) -> Self {
        Error::InvalidIdentifier {
            value: branch.to_string(),
            reason: format!("invalid branch name: {}", reason.into()),
        }
    }
}
