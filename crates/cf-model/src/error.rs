//! Error types for the cf-model crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while training, persisting, or loading the model
#[derive(Error, Debug)]
pub enum ModelError {
    /// I/O error while reading ratings or artifacts
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in the ratings file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// One of the four model artifacts is missing on disk.
    ///
    /// The artifact set is only valid as a whole; a partial set must
    /// fail the load rather than serve with a mismatched mapping.
    #[error("Missing model artifact: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    /// An artifact exists but could not be decoded
    #[error("Corrupt model artifact {}: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ModelError>;
