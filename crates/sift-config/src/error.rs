//! Error types for configuration loading and entry discovery.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Config parsing/loading errors
    #[error("config not found")]
    NotFound,

    #[error("invalid config value: {field}")]
    InvalidValue {
        field: String,
        hint: Option<String>,
    },

    // Entry discovery errors (fatal: abort target generation entirely)
    #[error("entry glob expansion failed for pattern {pattern:?}: {message}")]
    Discovery { pattern: String, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
