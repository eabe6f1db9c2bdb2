// EB Env Backup: Library root
//
// Re-exports the crypto, source, pipeline, and CLI modules.

pub mod aws;
pub mod cli;
pub mod crypto;
pub mod error;
pub mod pipeline;
pub mod source;

pub use error::{BackupError, Result};
