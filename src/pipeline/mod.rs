// EB Env Backup: Pipeline Module
//
// Orchestrates fetch -> serialize -> encrypt -> persist, and the reverse
// restore path, around whichever engine was selected at startup.

mod artifacts;
mod backup;
mod upload;

pub use artifacts::{data_key_path, timestamp, ArtifactPaths, DATA_KEY_SUFFIX};
pub use backup::Pipeline;
pub use upload::{object_key, S3Uploader, DATA_KEY_METADATA, OBJECT_PREFIX};

pub(crate) use artifacts::read as read_artifact;
