//! Commit-message skip detection

/// Markers a committer may place anywhere in the commit message to opt the
/// commit out of CI. Matched case-sensitively, as literal substrings.
const SKIP_MARKERS: [&str; 2] = ["[ci skip]", "[skip ci]"];

/// Whether the commit message requests skipping the pipeline
pub fn requested(message: &str) -> bool {
    SKIP_MARKERS.iter().any(|marker| message.contains(marker))
}
