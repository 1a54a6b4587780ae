//! Error types for map plotting and attribute dumping.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading inputs, computing bounds or rendering.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("no features to compute bounds from")]
    EmptyInput,

    #[error("invalid envelope: ({min_x}, {min_y}) to ({max_x}, {max_y})")]
    InvalidEnvelope {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    #[error("malformed file {}: {reason}", path.display())]
    FileFormat { path: PathBuf, reason: String },

    #[error("unsupported projection: {0}")]
    UnsupportedProjection(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("display error: {0}")]
    Display(String),
}

impl MapError {
    /// Builds a [`MapError::FileFormat`] from any displayable reader error.
    pub fn file_format(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        MapError::FileFormat {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for map operations.
pub type Result<T> = std::result::Result<T, MapError>;
