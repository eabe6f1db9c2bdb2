// EB Env Backup: Source error types

use thiserror::Error;

/// Failure retrieving the configuration record. Always surfaces before any
/// encryption work begins.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Upstream fetch failed: {call}: {message}")]
    Fetch { call: &'static str, message: String },

    #[error("Upstream response incomplete: {0}")]
    Incomplete(String),
}
