//! Error types for the dispatcher

use thiserror::Error;

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors that can occur while dispatching a pipeline
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The current directory is not a git repository
    #[error("current directory is not a git repository")]
    NotARepository,

    /// The repository has a working tree; the hook must run server-side
    #[error("repository is not bare, refusing to dispatch")]
    NotBare,

    /// The revision argument did not resolve to a commit
    #[error("unknown revision '{0}'")]
    UnknownRevision(String),

    /// The commit's committer signature carries no usable email
    #[error("commit {0} has no usable committer email")]
    MissingCommitterEmail(String),

    /// The commit's tree has no `.james-ci.yml` (only an error under --force)
    #[error("no .james-ci.yml in this revision")]
    ConfigNotFound,

    /// `.james-ci.yml` exists but is not valid YAML
    ///
    /// The parser only sees an in-memory buffer, so the filename is attached
    /// here to keep diagnostics unambiguous.
    #[error(".james-ci.yml: {source}")]
    InvalidConfig {
        #[source]
        source: serde_yaml::Error,
    },

    /// The scheduler executable could not be started
    #[error("failed to run scheduler '{scheduler}'")]
    SchedulerSpawn {
        /// Executable name or path as configured
        scheduler: String,
        #[source]
        source: std::io::Error,
    },

    /// The scheduler ran but reported failure
    #[error("scheduler failed ({status})")]
    SchedulerFailed {
        /// The child's exit status
        status: std::process::ExitStatus,
    },

    /// Any other repository access failure
    #[error(transparent)]
    Git(#[from] git2::Error),
}
