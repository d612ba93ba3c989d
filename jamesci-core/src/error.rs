//! Error types for the James CI core library

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while importing or persisting pipelines
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configuration has no `jobs` mapping, or it is empty
    #[error("pipeline configuration defines no jobs")]
    MissingJobs,

    /// A job's configuration could not be imported
    #[error("failed to load job '{name}'")]
    JobImport {
        /// Name of the offending job
        name: String,
        #[source]
        source: Box<CoreError>,
    },

    /// A job's configuration is malformed
    #[error("{0}")]
    InvalidJob(String),

    /// The `stages` key is present but not a list of stage names
    #[error("'stages' must be a list of stage names")]
    InvalidStages,

    /// A job references a stage not listed under `stages`
    #[error("job '{job}' references unknown stage '{stage}'")]
    UnknownStage {
        /// Name of the offending job
        job: String,
        /// The stage it references
        stage: String,
    },

    /// Concurrent pipeline creations kept winning the ID reservation
    #[error("other processes block pipeline ID assignment")]
    IdAssignment,

    /// Filesystem access to the pipeline working directory failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A `pipeline.yml` could not be read or written
    #[error("invalid pipeline data: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
