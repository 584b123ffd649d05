//! Error taxonomy for target generation and profile builds.
//!
//! Discovery, transpile and minify failures are fatal for the affected
//! target build and surface to the invoking process as a non-zero outcome.
//! Per-specifier resolution failures are soft: they accumulate on the run
//! context and never appear here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TargetError>;

#[derive(Debug, Error)]
pub enum TargetError {
    // Entry glob expansion failed: aborts target generation entirely.
    #[error(transparent)]
    Discovery(#[from] sift_config::ConfigError),

    #[error("transpile failed for profile {profile}: {message}")]
    Transpile { profile: String, message: String },

    #[error("minify failed for profile {profile}: {message}")]
    Minify { profile: String, message: String },

    #[error(transparent)]
    Pattern(#[from] sift_resolve::ResolveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
