//! James CI Core
//!
//! Core types and persistence for James CI pipelines.
//!
//! This crate contains:
//! - Domain types: Pipeline and Job, imported from a repository's
//!   `.james-ci.yml` configuration
//! - Store: pipeline working-directory layout, ID assignment and the
//!   on-disk `pipeline.yml` format

pub mod domain;
pub mod error;
pub mod store;

// Re-export commonly used types
pub use domain::pipeline::Pipeline;
pub use error::{CoreError, Result};
