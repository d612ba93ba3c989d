//! Domain types for James CI pipelines

pub mod job;
pub mod pipeline;

pub use job::Job;
pub use pipeline::{Pipeline, PipelineMeta};
