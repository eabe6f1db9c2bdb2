// EB Env Backup: Top-level error types
//
// Aggregates errors from the crypto and source modules into a single error
// enum for the application boundary. Every variant is fatal for the run.

use thiserror::Error;

/// Top-level error type for all backup and restore operations.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] crate::crypto::CryptoError),

    #[error("Source error: {0}")]
    Source(#[from] crate::source::SourceError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upload error: {0}")]
    Upload(String),
}

impl BackupError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        BackupError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
