// EB Env Backup: Object storage upload
//
// Ships the ciphertext to S3 instead of the local filesystem. The wrapped data
// key travels with the object as base64 user metadata, so the object alone is
// enough to restore (together with access to the managed key).

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Local};

use super::artifacts::timestamp;
use crate::crypto::EncryptionOutput;
use crate::error::{BackupError, Result};

/// Object key prefix for uploaded backups.
pub const OBJECT_PREFIX: &str = "beanstalk_env_vars_backup_";

/// User metadata key holding the base64 wrapped data key.
pub const DATA_KEY_METADATA: &str = "dataKey";

pub fn object_key(now: DateTime<Local>) -> String {
    format!("{}{}.json", OBJECT_PREFIX, timestamp(now))
}

/// Base64 of the wrapped key, if the method produced one.
pub fn data_key_metadata(output: &EncryptionOutput) -> Option<String> {
    output
        .has_data_key()
        .then(|| BASE64.encode(output.encrypted_data_key()))
}

pub struct S3Uploader {
    client: Client,
    bucket: String,
}

impl S3Uploader {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn from_conf(config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        Self::new(Client::new(config), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload the ciphertext and return the object key it was stored under.
    pub async fn upload(&self, output: &EncryptionOutput, now: DateTime<Local>) -> Result<String> {
        let key = object_key(now);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(output.encrypted_data().to_vec()));
        if let Some(data_key) = data_key_metadata(output) {
            request = request.metadata(DATA_KEY_METADATA, data_key);
        }

        request.send().await.map_err(|e| {
            BackupError::Upload(format!(
                "PutObject s3://{}/{} failed: {}",
                self.bucket,
                key,
                DisplayErrorContext(&e)
            ))
        })?;

        tracing::info!(bucket = %self.bucket, key = %key, "Uploaded backup");
        Ok(key)
    }
}
