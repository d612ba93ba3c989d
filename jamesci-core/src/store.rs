//! Pipeline store
//!
//! Handles the on-disk layout of pipeline working directories. Every project
//! owns one directory; each pipeline of that project lives in a numbered
//! subdirectory holding its `pipeline.yml`:
//!
//! ```text
//! <root>/<project>/<pipeline-id>/pipeline.yml
//! ```
//!
//! IDs are sequential positive integers. An ID is reserved by creating its
//! directory, so concurrent dispatchers racing for the same ID cannot both
//! win: `mkdir` succeeds for exactly one of them.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::pipeline::Pipeline;
use crate::error::{CoreError, Result};

/// Name of a pipeline's persisted configuration file
pub const PIPELINE_FILE: &str = "pipeline.yml";

/// How often to retry ID reservation before giving up
const ID_ATTEMPTS: u32 = 3;

/// The working directory of a pipeline
pub fn working_dir(project_wd: &Path, id: u64) -> PathBuf {
    project_wd.join(id.to_string())
}

/// Persist a pipeline under the project's working directory
///
/// Reserves the next free ID by creating its directory, then writes the
/// pipeline's `pipeline.yml`. Loses races against concurrent creators
/// gracefully by rescanning for the next ID, up to [`ID_ATTEMPTS`] times.
///
/// # Returns
/// The assigned pipeline ID.
pub fn create(pipeline: &Pipeline, project_wd: &Path) -> Result<u64> {
    fs::create_dir_all(project_wd)?;

    for _ in 0..ID_ATTEMPTS {
        let id = next_id(project_wd)?;
        let dir = working_dir(project_wd, id);
        match fs::create_dir(&dir) {
            Ok(()) => {
                fs::write(dir.join(PIPELINE_FILE), serde_yaml::to_string(pipeline)?)?;
                debug!(id, dir = %dir.display(), "pipeline persisted");
                return Ok(id);
            }
            // Another process reserved this ID first; rescan.
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err.into()),
        }
    }

    Err(CoreError::IdAssignment)
}

/// Load a pipeline from the project's working directory
pub fn load(project_wd: &Path, id: u64) -> Result<Pipeline> {
    let raw = fs::read_to_string(working_dir(project_wd, id).join(PIPELINE_FILE))?;
    Ok(serde_yaml::from_str(&raw)?)
}

/// Next free pipeline ID for a project
///
/// The maximum numeric directory name incremented by one; 1 for a missing or
/// empty project directory. Non-numeric entries are ignored.
fn next_id(project_wd: &Path) -> Result<u64> {
    let entries = match fs::read_dir(project_wd) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(1),
        Err(err) => return Err(err.into()),
    };

    let mut max = 0;
    for entry in entries {
        if let Some(id) = entry?.file_name().to_str().and_then(|name| name.parse().ok()) {
            max = u64::max(max, id);
        }
    }
    Ok(max + 1)
}
