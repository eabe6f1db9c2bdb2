// EB Env Backup: CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: backup, restore, upload, methods.
// The camelCase spellings of the original flags are accepted as aliases.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::crypto::{EncryptionArgs, SymmetricEngine};

pub use commands::execute;

/// Encrypted backups of Elastic Beanstalk environment variables.
#[derive(Parser, Debug)]
#[command(name = "eb-env-backup")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that encrypts or decrypts.
#[derive(Args, Debug, Clone)]
pub struct EncryptionOpts {
    /// Encryption method; run `eb-env-backup methods` for the choices.
    #[arg(long = "encryption-method", alias = "encryptionMethod", default_value = SymmetricEngine::DEFAULT_NAME)]
    pub method: String,

    /// Passphrase for AESCipherEncryption.
    #[arg(long, alias = "passPhrase", env = "EB_BACKUP_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// ARN of the KMS key for KMSEncryption.
    #[arg(long, alias = "kmsKeyArn", env = "EB_BACKUP_KMS_KEY_ARN")]
    pub kms_key_arn: Option<String>,

    /// AWS region override; defaults to the standard provider chain.
    #[arg(long)]
    pub region: Option<String>,
}

impl EncryptionOpts {
    /// Build the engine arguments, attaching the wrapped data key when restoring.
    pub fn encryption_args(&self, encrypted_data_key: Option<Vec<u8>>) -> EncryptionArgs {
        let mut args = EncryptionArgs::new();
        if let Some(passphrase) = &self.passphrase {
            args = args.with_passphrase(passphrase.as_bytes());
        }
        if let Some(arn) = &self.kms_key_arn {
            args = args.with_kms_key_arn(arn.as_str());
        }
        if let Some(wrapped) = encrypted_data_key {
            args = args.with_encrypted_data_key(wrapped);
        }
        args
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch all environment variables and write an encrypted backup.
    Backup {
        /// File the ciphertext is written to; a wrapped key lands in `<file>_dataKey`.
        #[arg(long = "dest-file", alias = "destFile")]
        dest_file: PathBuf,

        #[command(flatten)]
        encryption: EncryptionOpts,
    },

    /// Decrypt a backup into a new timestamped JSON file.
    Restore {
        /// Encrypted backup to decrypt.
        #[arg(long = "source-file", alias = "destFile")]
        source_file: PathBuf,

        /// Wrapped data key written next to a KMSEncryption backup.
        #[arg(long, alias = "encryptedDataKeyFile")]
        encrypted_data_key_file: Option<PathBuf>,

        /// Directory the decrypted file is created in.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        encryption: EncryptionOpts,
    },

    /// Fetch, encrypt and upload a backup to an S3 bucket.
    Upload {
        /// Destination bucket.
        #[arg(long)]
        bucket: String,

        /// Role assumed to read Beanstalk configuration in another account.
        #[arg(long, alias = "assumeRoleArn")]
        assume_role_arn: Option<String>,

        #[command(flatten)]
        encryption: EncryptionOpts,
    },

    /// List the available encryption methods.
    Methods,
}
