//! Bare-repository access
//!
//! Thin typed wrappers around git2 for the few reads the dispatcher needs:
//! open the repository the hook fired in, resolve the pushed revision, and
//! fetch the pipeline configuration from that commit's tree. All access is
//! read-only.

use std::path::Path;

use git2::{Commit, ErrorCode, Repository};

use crate::error::{DispatchError, Result};

/// Path of the pipeline configuration inside the repository
pub const CONFIG_FILE: &str = ".james-ci.yml";

/// Open the bare repository at `path`
///
/// # Errors
/// * [`DispatchError::NotARepository`] if `path` is not a git repository
/// * [`DispatchError::NotBare`] if it has a working tree; the hook runs
///   server-side against bare repositories only
pub fn open(path: &Path) -> Result<Repository> {
    let repo = Repository::open(path).map_err(|err| match err.code() {
        ErrorCode::NotFound => DispatchError::NotARepository,
        _ => DispatchError::Git(err),
    })?;
    if !repo.is_bare() {
        return Err(DispatchError::NotBare);
    }
    Ok(repo)
}

/// Resolve a revision string (ref name or hash) to a commit
pub fn resolve_commit<'repo>(repo: &'repo Repository, revision: &str) -> Result<Commit<'repo>> {
    repo.revparse_single(revision)
        .and_then(|object| object.peel_to_commit())
        .map_err(|_| DispatchError::UnknownRevision(revision.to_owned()))
}

/// The commit's committer email, used as the pipeline's contact address
pub fn committer_email(commit: &Commit<'_>) -> Result<String> {
    commit
        .committer()
        .email()
        .map(str::to_owned)
        .ok_or_else(|| DispatchError::MissingCommitterEmail(commit.id().to_string()))
}

/// Fetch and parse the commit's `.james-ci.yml`
///
/// The file is read from the commit's tree, not from any checkout. Returns
/// `None` when the tree has no such file, the expected case for repositories
/// that never opted into CI.
///
/// # Errors
/// [`DispatchError::InvalidConfig`] if the file exists but is not valid YAML.
pub fn pipeline_config(
    repo: &Repository,
    commit: &Commit<'_>,
) -> Result<Option<serde_yaml::Value>> {
    let tree = commit.tree()?;
    let entry = match tree.get_path(Path::new(CONFIG_FILE)) {
        Ok(entry) => entry,
        Err(err) if err.code() == ErrorCode::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let blob = repo.find_blob(entry.id())?;
    let config = serde_yaml::from_slice(blob.content())
        .map_err(|source| DispatchError::InvalidConfig { source })?;
    Ok(Some(config))
}
