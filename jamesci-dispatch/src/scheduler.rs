//! Scheduler hand-off
//!
//! The dispatcher's last step: start the configured scheduler executable for
//! the freshly created pipeline and wait for it to accept the work.

use std::process::Command;

use tracing::debug;

use crate::error::{DispatchError, Result};

/// Invoke the scheduler for one pipeline and wait for completion
///
/// The child is spawned as `<scheduler> <project> <pipeline-id>`. `GIT_DIR`
/// is dropped from the child's environment: the hook inherits it from the
/// git server, and git commands run by the scheduler's jobs must resolve
/// paths relative to their own working directories instead.
///
/// # Errors
/// * [`DispatchError::SchedulerSpawn`] if the executable cannot be started
/// * [`DispatchError::SchedulerFailed`] on a non-zero exit status
pub fn run(scheduler: &str, project: &str, pipeline_id: u64) -> Result<()> {
    debug!(scheduler, project, pipeline_id, "invoking scheduler");

    let status = Command::new(scheduler)
        .arg(project)
        .arg(pipeline_id.to_string())
        .env_remove("GIT_DIR")
        .status()
        .map_err(|source| DispatchError::SchedulerSpawn {
            scheduler: scheduler.to_owned(),
            source,
        })?;

    if !status.success() {
        return Err(DispatchError::SchedulerFailed { status });
    }
    Ok(())
}
