//! Error types for the resolution engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid substitution pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}
