//! James CI Dispatcher
//!
//! Post-receive hook entry point of James CI. Invoked by the git server with
//! a project name and a pushed revision, it decides whether that revision
//! gets a pipeline: commits may opt out via their message, repositories opt
//! in by carrying a `.james-ci.yml`. If a pipeline is due, it is constructed
//! from that file, persisted under the project's working directory, and
//! handed to the external scheduler.
//!
//! The whole run is synchronous and fail-fast; any error ends up as a single
//! prefixed line on stderr and a non-zero exit (or, with `JAMESCI_DEBUG`
//! set, the full error chain for development).

mod config;
mod error;
mod repo;
mod scheduler;
mod skip;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;
use crate::error::DispatchError;
use jamesci_core::Pipeline;

#[derive(Parser)]
#[command(name = "james-ci-dispatch")]
#[command(about = "Dispatch CI pipelines for newly pushed revisions", long_about = None)]
struct Cli {
    /// Name of the project the revision belongs to
    project: String,

    /// Revision (ref or hash) to run the pipeline for
    revision: String,

    /// Treat a missing .james-ci.yml as an error instead of skipping
    #[arg(short, long)]
    force: bool,

    /// Settings file with host-wide defaults (root, scheduler)
    #[arg(
        long,
        env = "JAMESCI_CONFIG",
        default_value = config::DEFAULT_CONFIG_PATH
    )]
    config: std::path::PathBuf,
}

fn main() -> ExitCode {
    // Logging and the error boundary are in place before anything fallible
    // runs. Usage errors are the exception: clap exits on its own.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jamesci_dispatch=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if std::env::var_os("JAMESCI_DEBUG").is_some() {
                eprintln!("{err:?}");
            } else {
                eprintln!("james-ci-dispatch: error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

/// One dispatch run, start to finish
///
/// Returns `Ok(())` both for a dispatched pipeline and for the two skip
/// cases (commit opted out, repository not opted in).
fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::from_file(&cli.config)?;

    let repo = repo::open(Path::new("."))?;
    let commit = repo::resolve_commit(&repo, &cli.revision)?;

    if skip::requested(commit.message().unwrap_or_default()) {
        info!(revision = %cli.revision, "commit opted out of CI, skipping");
        return Ok(());
    }

    let pipeline_config = match repo::pipeline_config(&repo, &commit)? {
        Some(config) => config,
        None if cli.force => return Err(DispatchError::ConfigNotFound.into()),
        None => {
            debug!(project = %cli.project, "no pipeline configuration, nothing to do");
            return Ok(());
        }
    };

    let contact = repo::committer_email(&commit)?;
    let mut pipeline = Pipeline::new(&pipeline_config, &cli.revision, &contact)
        .context("failed to construct pipeline")?;

    let project_dir = settings.project_dir(&cli.project);
    let pipeline_id = pipeline
        .create(&project_dir)
        .with_context(|| format!("failed to persist pipeline in {}", project_dir.display()))?;
    info!(project = %cli.project, pipeline_id, "pipeline created");

    scheduler::run(&settings.scheduler, &cli.project, pipeline_id)?;
    Ok(())
}
