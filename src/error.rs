//! Error types shared across the crate

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a durable key-value store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures raised while writing collections through the repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to decode {key}: {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Rejected timer creation input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("timer name must not be empty")]
    EmptyName,

    #[error("duration {0:?} is not a whole number of seconds")]
    NonNumericDuration(String),

    #[error("duration must be a positive number of seconds, got {0}")]
    NonPositiveDuration(i64),

    #[error("unknown category {0:?}, expected Workout, Study or Break")]
    UnknownCategory(String),
}

/// Failures raised while exporting the history log to a file
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to read history: {0}")]
    Store(#[from] StoreError),

    #[error("failed to write export file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
