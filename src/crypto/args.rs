// EB Env Backup: Encryption arguments
//
// The option bag an engine is configured with before it encrypts or decrypts.
// An engine is reconfigured by replacing the whole value, never by patching
// individual fields. Secret fields are wiped on drop and redacted in Debug.

use std::fmt;

use zeroize::Zeroizing;

/// Option name of the raw symmetric secret.
pub const PASSPHRASE: &str = "passphrase";

/// Option name of the managed key identifier used for envelope encryption.
pub const KMS_KEY_ARN: &str = "kmsKeyArn";

/// Option name of the wrapped data key needed to decrypt in envelope mode.
pub const ENCRYPTED_DATA_KEY: &str = "encryptedDataKey";

#[derive(Clone, Default)]
pub struct EncryptionArgs {
    passphrase: Option<Zeroizing<Vec<u8>>>,
    kms_key_arn: Option<String>,
    encrypted_data_key: Option<Vec<u8>>,
}

impl EncryptionArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty values are treated as unset, matching how unset CLI flags arrive.
    pub fn with_passphrase(mut self, passphrase: impl Into<Vec<u8>>) -> Self {
        let passphrase = Zeroizing::new(passphrase.into());
        self.passphrase = (!passphrase.is_empty()).then_some(passphrase);
        self
    }

    pub fn with_kms_key_arn(mut self, arn: impl Into<String>) -> Self {
        let arn = arn.into();
        self.kms_key_arn = (!arn.trim().is_empty()).then_some(arn);
        self
    }

    pub fn with_encrypted_data_key(mut self, wrapped: impl Into<Vec<u8>>) -> Self {
        let wrapped = wrapped.into();
        self.encrypted_data_key = (!wrapped.is_empty()).then_some(wrapped);
        self
    }

    pub fn passphrase(&self) -> Option<&[u8]> {
        self.passphrase.as_ref().map(|p| p.as_slice())
    }

    pub fn kms_key_arn(&self) -> Option<&str> {
        self.kms_key_arn.as_deref()
    }

    pub fn encrypted_data_key(&self) -> Option<&[u8]> {
        self.encrypted_data_key.as_deref()
    }
}

impl fmt::Debug for EncryptionArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionArgs")
            .field(
                PASSPHRASE,
                &self.passphrase.as_ref().map(|_| "[REDACTED]"),
            )
            .field(KMS_KEY_ARN, &self.kms_key_arn)
            .field(
                ENCRYPTED_DATA_KEY,
                &self.encrypted_data_key.as_ref().map(|k| format!("{} bytes", k.len())),
            )
            .finish()
    }
}
