//! Error types for loading, rendering and writing customize files

use std::path::PathBuf;
use thiserror::Error;

/// Result type for customize operations
pub type CustomizeResult<T> = Result<T, CustomizeError>;

/// Errors that can occur while processing a customize file
#[derive(Debug, Error)]
pub enum CustomizeError {
    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write or copy a file
    #[error("failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Customize file is not valid YAML
    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Customize file is valid YAML but not a usable shape
    #[error("invalid customize data in {path}: {reason}")]
    InvalidStore { path: PathBuf, reason: String },

    /// Merged result could not be serialized
    #[error("failed to serialize customize data: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
