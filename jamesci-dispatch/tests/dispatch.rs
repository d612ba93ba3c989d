//! End-to-end tests for the dispatcher binary
//!
//! Each test builds a fixture bare repository, points the dispatcher at it
//! via a throwaway settings file, and replaces the scheduler with a stub
//! shell script that records how it was invoked.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const VALID_CONFIG: &str = "\
stages:
  - build
jobs:
  build:
    stage: build
    script:
      - make
";

/// Fixture environment for one dispatcher run
struct Fixture {
    dir: TempDir,
    repo: git2::Repository,
}

impl Fixture {
    fn bare() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init_bare(dir.path().join("repo.git")).unwrap();
        Self { dir, repo }
    }

    fn worktree() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path().join("repo.git")).unwrap();
        Self { dir, repo }
    }

    /// Commit a tree to HEAD, optionally containing a `.james-ci.yml`
    fn commit(&self, message: &str, config: Option<&str>) -> String {
        let mut builder = self.repo.treebuilder(None).unwrap();
        let readme = self.repo.blob(b"demo project\n").unwrap();
        builder.insert("README", readme, 0o100644).unwrap();
        if let Some(raw) = config {
            let blob = self.repo.blob(raw.as_bytes()).unwrap();
            builder.insert(".james-ci.yml", blob, 0o100644).unwrap();
        }
        let tree = self.repo.find_tree(builder.write().unwrap()).unwrap();

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();

        let sig = git2::Signature::now("Jane Dev", "jane@example.org").unwrap();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
            .to_string()
    }

    /// Write a stub scheduler that records its arguments (and whether
    /// GIT_DIR leaked through) before exiting with `exit_code`
    fn stub_scheduler(&self, exit_code: i32) -> PathBuf {
        let path = self.dir.path().join("scheduler.sh");
        let script = format!(
            "#!/bin/sh\nprintf '%s %s %s' \"$1\" \"$2\" \"${{GIT_DIR-unset}}\" > {}\nexit {}\n",
            self.scheduler_log().display(),
            exit_code
        );
        fs::write(&path, script).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn scheduler_log(&self) -> PathBuf {
        self.dir.path().join("scheduler.log")
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("pipelines")
    }

    /// Run the dispatcher from inside the repository
    fn dispatch(&self, scheduler: &Path, args: &[&str]) -> Output {
        let settings = self.dir.path().join("config.yml");
        fs::write(
            &settings,
            format!(
                "root: {}\nscheduler: {}\n",
                self.root().display(),
                scheduler.display()
            ),
        )
        .unwrap();

        Command::new(env!("CARGO_BIN_EXE_james-ci-dispatch"))
            .args(args)
            .current_dir(self.dir.path().join("repo.git"))
            .env("JAMESCI_CONFIG", &settings)
            .env("GIT_DIR", "/nonexistent/inherited.git")
            .env_remove("JAMESCI_DEBUG")
            .output()
            .unwrap()
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_valid_config_creates_pipeline_and_schedules() {
    let fixture = Fixture::bare();
    let revision = fixture.commit("add pipeline", Some(VALID_CONFIG));
    let scheduler = fixture.stub_scheduler(0);

    let output = fixture.dispatch(&scheduler, &["demo", &revision]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let pipeline_file = fixture.root().join("demo/1/pipeline.yml");
    assert!(pipeline_file.is_file());
    let pipeline: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(pipeline_file).unwrap()).unwrap();
    assert_eq!(
        pipeline["meta"]["contact"].as_str(),
        Some("jane@example.org")
    );
    assert_eq!(pipeline["meta"]["revision"].as_str(), Some(revision.as_str()));

    // Invoked as `<scheduler> <project> <id>`, with GIT_DIR scrubbed.
    let log = fs::read_to_string(fixture.scheduler_log()).unwrap();
    assert_eq!(log, "demo 1 unset");
}

#[test]
fn test_revision_may_be_a_ref_name() {
    let fixture = Fixture::bare();
    fixture.commit("add pipeline", Some(VALID_CONFIG));
    let scheduler = fixture.stub_scheduler(0);

    let output = fixture.dispatch(&scheduler, &["demo", "HEAD"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(fixture.root().join("demo/1/pipeline.yml").is_file());
}

#[test]
fn test_skip_marker_dispatches_nothing() {
    let fixture = Fixture::bare();
    let scheduler = fixture.stub_scheduler(0);

    for message in ["fix bug [ci skip] please", "[skip ci] wip"] {
        let revision = fixture.commit(message, Some(VALID_CONFIG));
        let output = fixture.dispatch(&scheduler, &["demo", &revision]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    }

    assert!(!fixture.root().exists());
    assert!(!fixture.scheduler_log().exists());
}

#[test]
fn test_missing_config_skips_silently() {
    let fixture = Fixture::bare();
    let revision = fixture.commit("no ci here", None);
    let scheduler = fixture.stub_scheduler(0);

    let output = fixture.dispatch(&scheduler, &["demo", &revision]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!fixture.root().exists());
    assert!(!fixture.scheduler_log().exists());
}

#[test]
fn test_missing_config_with_force_fails() {
    let fixture = Fixture::bare();
    let revision = fixture.commit("no ci here", None);
    let scheduler = fixture.stub_scheduler(0);

    let output = fixture.dispatch(&scheduler, &["demo", &revision, "--force"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains(".james-ci.yml"));
    assert!(!fixture.root().exists());
}

#[test]
fn test_invalid_config_reports_filename() {
    let fixture = Fixture::bare();
    let revision = fixture.commit("break the config", Some("jobs: [unterminated"));
    let scheduler = fixture.stub_scheduler(0);

    let output = fixture.dispatch(&scheduler, &["demo", &revision]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains(".james-ci.yml"));
    assert!(!fixture.scheduler_log().exists());
}

#[test]
fn test_scheduler_failure_propagates() {
    let fixture = Fixture::bare();
    let revision = fixture.commit("add pipeline", Some(VALID_CONFIG));
    let scheduler = fixture.stub_scheduler(3);

    let output = fixture.dispatch(&scheduler, &["demo", &revision]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("scheduler"));
    // The pipeline was persisted before the hand-off failed.
    assert!(fixture.root().join("demo/1/pipeline.yml").is_file());
}

#[test]
fn test_non_bare_repository_rejected() {
    let fixture = Fixture::worktree();
    let scheduler = fixture.stub_scheduler(0);

    let output = fixture.dispatch(&scheduler, &["demo", "HEAD"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("bare"));
}

#[test]
fn test_unknown_revision_fails() {
    let fixture = Fixture::bare();
    fixture.commit("something", Some(VALID_CONFIG));
    let scheduler = fixture.stub_scheduler(0);

    let output = fixture.dispatch(&scheduler, &["demo", "no-such-branch"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown revision"));
}

#[test]
fn test_missing_arguments_exit_with_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_james-ci-dispatch"))
        .arg("only-a-project")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).to_lowercase().contains("usage"));
}
