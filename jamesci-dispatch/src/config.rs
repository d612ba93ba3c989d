//! Dispatcher configuration
//!
//! Host-wide settings shared by all repositories the hook is installed in.
//! Loaded from a YAML file; a missing file means all defaults, so the hook
//! can be enabled across many repositories before the host is configured.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/james-ci/config.yml";

/// Default directory holding all projects' pipeline working directories
const DEFAULT_ROOT: &str = "/var/lib/james-ci";

/// Default scheduler executable, resolved via PATH
const DEFAULT_SCHEDULER: &str = "james-ci-schedule";

/// Host-wide dispatcher settings
///
/// Every field is optional in the settings file and falls back to its
/// documented default. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding pipeline working directories, one per project
    pub root: PathBuf,

    /// Scheduler executable to hand finished pipelines to
    pub scheduler: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            scheduler: DEFAULT_SCHEDULER.to_owned(),
        }
    }
}

impl Settings {
    /// Load settings from a file, defaulting everything if the file does not
    /// exist
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_yaml::from_str(&raw)
                .with_context(|| format!("invalid settings file {}", path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => {
                Err(err).with_context(|| format!("cannot read settings file {}", path.display()))
            }
        }
    }

    /// Working directory holding all pipelines of one project
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.root.join(project)
    }
}
