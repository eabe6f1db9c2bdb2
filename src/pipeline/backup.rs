// EB Env Backup: Backup and restore orchestration
//
// Forward:  check config -> fetch -> serialize -> encrypt -> write artifacts
// Reverse:  check config -> read ciphertext -> decrypt -> write new JSON file
//
// Each run is an independent, sequential transaction. Nothing is retried and
// the first failure aborts the run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::artifacts::{self, ArtifactPaths};
use crate::crypto::{EncryptionOutput, Engine};
use crate::error::Result;
use crate::source::EnvironmentSource;

pub struct Pipeline {
    engine: Engine,
}

impl Pipeline {
    /// `engine` must already be configured for the direction it will run in.
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn method_name(&self) -> &str {
        self.engine.method_name()
    }

    /// Fetch the record and encrypt its JSON form. Configuration problems are
    /// reported before the source is contacted.
    pub async fn encrypt_record(&self, source: &dyn EnvironmentSource) -> Result<EncryptionOutput> {
        self.engine.check_encrypt_ready()?;

        let record = source.fetch().await?;
        let plaintext = record.to_json_bytes()?;

        let output = self.engine.encrypt(&plaintext).await?;
        tracing::info!(
            method = %self.engine.method_name(),
            environments = record.environments.len(),
            ciphertext_len = output.encrypted_data().len(),
            "Encrypted configuration record"
        );
        Ok(output)
    }

    pub async fn backup(
        &self,
        source: &dyn EnvironmentSource,
        destination: &Path,
    ) -> Result<ArtifactPaths> {
        let output = self.encrypt_record(source).await?;
        let paths = artifacts::write_artifacts(destination, &output)?;
        tracing::info!(path = %paths.ciphertext.display(), "Backup written");
        Ok(paths)
    }

    pub async fn restore(&self, ciphertext: &Path, output_dir: &Path) -> Result<PathBuf> {
        self.restore_at(ciphertext, output_dir, Local::now()).await
    }

    /// Decrypt `ciphertext` into `<output_dir>/<timestamp>.json`.
    pub async fn restore_at(
        &self,
        ciphertext: &Path,
        output_dir: &Path,
        now: DateTime<Local>,
    ) -> Result<PathBuf> {
        self.engine.check_decrypt_ready()?;

        let data = artifacts::read(ciphertext)?;
        let plaintext = self.engine.decrypt(&data).await?;

        let target = output_dir.join(format!("{}.json", artifacts::timestamp(now)));
        artifacts::write_new(&target, &plaintext)?;
        tracing::info!(path = %target.display(), "Decrypted data written");
        Ok(target)
    }
}
