//! Job domain types

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{CoreError, Result};

/// A single job of a pipeline
///
/// Structure shared between the dispatcher (persists) and the runner
/// (executes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Stage this job runs in, if the pipeline declares stages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Shell commands executed by the runner, in order
    pub script: Vec<String>,
}

impl Job {
    /// Import a job from its raw in-repository configuration
    ///
    /// `script` may be given as a single command or a list of commands.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidJob`] if the configuration is not a
    /// mapping, `script` is missing, or either field has the wrong type.
    pub fn from_config(config: &Value) -> Result<Self> {
        if !config.is_mapping() {
            return Err(CoreError::InvalidJob(
                "job configuration must be a mapping".into(),
            ));
        }

        let stage = match config.get("stage") {
            None => None,
            Some(value) => Some(
                value
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| CoreError::InvalidJob("'stage' must be a string".into()))?,
            ),
        };

        let script = match config.get("script") {
            None => return Err(CoreError::InvalidJob("missing 'script'".into())),
            Some(Value::String(command)) => vec![command.clone()],
            Some(Value::Sequence(commands)) => commands
                .iter()
                .map(|command| command.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    CoreError::InvalidJob("'script' must be a list of commands".into())
                })?,
            Some(_) => {
                return Err(CoreError::InvalidJob(
                    "'script' must be a command or list of commands".into(),
                ));
            }
        };
        if script.is_empty() {
            return Err(CoreError::InvalidJob("'script' must not be empty".into()));
        }

        Ok(Self { stage, script })
    }
}
