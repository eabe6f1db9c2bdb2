// EB Env Backup: CLI Command Handlers
//
// Each function handles one CLI subcommand. The method registry is built once
// per run, the selected engine is configured from the command line, and the
// pipeline does the rest. Configuration problems are reported before any AWS
// client is created.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;

use crate::aws::AwsSettings;
use crate::crypto::{AwsKmsKeyService, Engine, MethodRegistry};
use crate::error::BackupError;
use crate::pipeline::{read_artifact, Pipeline, S3Uploader};
use crate::source::BeanstalkSource;

use super::{Commands, EncryptionOpts};

/// Execute the parsed CLI command.
pub async fn execute(command: Commands) -> Result<(), BackupError> {
    match command {
        Commands::Backup {
            dest_file,
            encryption,
        } => cmd_backup(dest_file, encryption).await,
        Commands::Restore {
            source_file,
            encrypted_data_key_file,
            output_dir,
            encryption,
        } => cmd_restore(source_file, encrypted_data_key_file, output_dir, encryption).await,
        Commands::Upload {
            bucket,
            assume_role_arn,
            encryption,
        } => cmd_upload(bucket, assume_role_arn, encryption).await,
        Commands::Methods => cmd_methods(),
    }
}

// ─── Backup ──────────────────────────────────────────────────────────────────

async fn cmd_backup(dest_file: PathBuf, encryption: EncryptionOpts) -> Result<(), BackupError> {
    let settings = aws_settings(&encryption, None);
    let engine = select_engine(&encryption, &settings, None)?;
    engine.check_encrypt_ready()?;

    let source = BeanstalkSource::from_conf(&settings.load().await);
    let pipeline = Pipeline::new(engine);
    let paths = pipeline.backup(&source, &dest_file).await?;

    println!("✓ Backup written with {}", pipeline.method_name());
    println!("  Data:     {}", paths.ciphertext.display());
    if let Some(data_key) = paths.data_key {
        println!("  Data key: {}", data_key.display());
        println!("  Keep both files: the data is unrecoverable without the data key.");
    }

    Ok(())
}

// ─── Restore ─────────────────────────────────────────────────────────────────

async fn cmd_restore(
    source_file: PathBuf,
    encrypted_data_key_file: Option<PathBuf>,
    output_dir: PathBuf,
    encryption: EncryptionOpts,
) -> Result<(), BackupError> {
    let wrapped = encrypted_data_key_file
        .as_deref()
        .map(read_artifact)
        .transpose()?;

    let settings = aws_settings(&encryption, None);
    let engine = select_engine(&encryption, &settings, wrapped)?;
    if let (Engine::Envelope(_), None) = (&engine, &encrypted_data_key_file) {
        return Err(BackupError::Configuration(format!(
            "--encrypted-data-key-file is required to restore a {} backup",
            engine.method_name()
        )));
    }

    let restored = Pipeline::new(engine)
        .restore(&source_file, &output_dir)
        .await?;

    println!("✓ Decrypted data written to {}", restored.display());

    Ok(())
}

// ─── Upload ──────────────────────────────────────────────────────────────────

async fn cmd_upload(
    bucket: String,
    assume_role_arn: Option<String>,
    encryption: EncryptionOpts,
) -> Result<(), BackupError> {
    if bucket.trim().is_empty() {
        return Err(BackupError::Configuration("--bucket must not be empty".to_string()));
    }

    // Only the Beanstalk reads run under the assumed role; KMS and S3 use the
    // caller's own credentials.
    let own = aws_settings(&encryption, None);
    let engine = select_engine(&encryption, &own, None)?;
    engine.check_encrypt_ready()?;

    let source_settings = aws_settings(&encryption, assume_role_arn);
    let source = BeanstalkSource::from_conf(&source_settings.load().await);
    let pipeline = Pipeline::new(engine);
    let output = pipeline.encrypt_record(&source).await?;

    let uploader = S3Uploader::from_conf(&own.load().await, bucket);
    let key = uploader.upload(&output, Local::now()).await?;

    println!("✓ Uploaded s3://{}/{}", uploader.bucket(), key);

    Ok(())
}

// ─── Methods ─────────────────────────────────────────────────────────────────

fn cmd_methods() -> Result<(), BackupError> {
    let registry = build_registry(&AwsSettings::default());

    println!("Available encryption methods:");
    for name in registry.sorted_method_names() {
        println!("  {}", name);
    }

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn aws_settings(encryption: &EncryptionOpts, assume_role_arn: Option<String>) -> AwsSettings {
    AwsSettings {
        region: encryption.region.clone(),
        assume_role_arn: assume_role_arn.filter(|arn| !arn.trim().is_empty()),
    }
}

/// The registry of every engine this build supports. KMS is only contacted
/// if the envelope engine is actually used.
fn build_registry(settings: &AwsSettings) -> MethodRegistry {
    MethodRegistry::with_defaults(Arc::new(AwsKmsKeyService::new(settings.clone())))
}

fn select_engine(
    encryption: &EncryptionOpts,
    settings: &AwsSettings,
    encrypted_data_key: Option<Vec<u8>>,
) -> Result<Engine, BackupError> {
    let mut engine = build_registry(settings).select(&encryption.method)?;
    engine.configure(encryption.encryption_args(encrypted_data_key));
    tracing::debug!(method = %engine.method_name(), "Selected encryption method");
    Ok(engine)
}
