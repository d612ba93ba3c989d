//! Pipeline domain types

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::domain::job::Job;
use crate::error::{CoreError, Result};
use crate::store;

/// A pipeline for one revision of one project
///
/// Built either from a repository's `.james-ci.yml` via [`Pipeline::new`] or
/// from a previously persisted `pipeline.yml` via [`Pipeline::load`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// ID assigned by [`Pipeline::create`]; the ID is encoded in the
    /// working-directory name, not in `pipeline.yml`
    #[serde(skip)]
    pub id: Option<u64>,
    /// Declared stage order; jobs without a stage ignore it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<String>>,
    /// Jobs by name, never empty
    pub jobs: BTreeMap<String, Job>,
    /// Metadata stamped at construction time
    pub meta: PipelineMeta,
}

/// Pipeline metadata
///
/// Not part of the in-repository configuration; filled in when the pipeline
/// is constructed and persisted alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineMeta {
    /// Creation time as UNIX timestamp
    pub created: i64,
    /// Committer email, notified about the pipeline's outcome
    pub contact: String,
    /// Revision the runner checks out
    pub revision: String,
}

impl Pipeline {
    /// Construct a new pipeline from a repository's raw configuration
    ///
    /// # Arguments
    /// * `config` - Parsed contents of the repository's `.james-ci.yml`
    /// * `revision` - Revision the pipeline runs against
    /// * `contact` - Email address of the committer
    ///
    /// # Errors
    /// Returns an error if the configuration defines no jobs, a job fails to
    /// import, or a job references an undeclared stage.
    pub fn new(config: &Value, revision: &str, contact: &str) -> Result<Self> {
        let stages = config.get("stages").map(parse_stages).transpose()?;

        let jobs_config = config
            .get("jobs")
            .and_then(Value::as_mapping)
            .ok_or(CoreError::MissingJobs)?;
        if jobs_config.is_empty() {
            return Err(CoreError::MissingJobs);
        }

        let mut jobs = BTreeMap::new();
        for (name, job_config) in jobs_config {
            let name = name
                .as_str()
                .ok_or_else(|| CoreError::InvalidJob("job names must be strings".into()))?
                .to_owned();
            let job = Job::from_config(job_config).map_err(|source| CoreError::JobImport {
                name: name.clone(),
                source: Box::new(source),
            })?;
            if let (Some(stage), Some(stages)) = (&job.stage, &stages)
                && !stages.contains(stage)
            {
                return Err(CoreError::UnknownStage {
                    job: name,
                    stage: stage.clone(),
                });
            }
            jobs.insert(name, job);
        }

        Ok(Self {
            id: None,
            stages,
            jobs,
            meta: PipelineMeta {
                created: chrono::Utc::now().timestamp(),
                contact: contact.to_owned(),
                revision: revision.to_owned(),
            },
        })
    }

    /// Persist this pipeline under the project's working directory
    ///
    /// Assigns the next free ID (reserving it by creating the pipeline's
    /// working directory) and writes `pipeline.yml` into it.
    ///
    /// # Returns
    /// The assigned pipeline ID.
    pub fn create(&mut self, project_wd: &Path) -> Result<u64> {
        let id = store::create(self, project_wd)?;
        self.id = Some(id);
        Ok(id)
    }

    /// Load a previously persisted pipeline
    pub fn load(project_wd: &Path, id: u64) -> Result<Self> {
        let mut pipeline = store::load(project_wd, id)?;
        pipeline.id = Some(id);
        Ok(pipeline)
    }
}

fn parse_stages(value: &Value) -> Result<Vec<String>> {
    value
        .as_sequence()
        .and_then(|stages| {
            stages
                .iter()
                .map(|stage| stage.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or(CoreError::InvalidStages)
}
