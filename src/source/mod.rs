// EB Env Backup: Source Module
//
// Fetches the configuration record to back up. The encryption side treats the
// serialized record as opaque bytes.

mod beanstalk;
mod error;
mod models;

pub use beanstalk::{BeanstalkSource, EnvironmentSource, ENVIRONMENT_NAMESPACE};
pub use error::SourceError;
pub use models::{BackupRecord, EnvVar, EnvironmentVariables};

#[cfg(test)]
pub use beanstalk::mock;
