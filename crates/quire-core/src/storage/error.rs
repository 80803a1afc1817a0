//! # Quire Core Storage System Errors
//!
//! Defines error types specific to the storage layer: file I/O with path
//! context, configuration parsing failures, and malformed configuration
//! documents.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageSystemError {
    #[error("I/O error during operation '{operation}' on path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization to '{format}' failed: {source}")]
    SerializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Deserialization of '{}' from '{format}' failed: {source}", path.display())]
    DeserializationError {
        path: PathBuf,
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Unsupported configuration format: {}", .0.display())]
    UnsupportedConfigFormat(PathBuf),

    #[error("Invalid configuration in '{}': {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },
}

impl StorageSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        StorageSystemError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
