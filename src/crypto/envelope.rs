// EB Env Backup: Envelope (KMS-brokered) Engine
//
// Flow:
//   1. Encrypt: ask the key service for a fresh data key under `kmsKeyArn`,
//      seal the payload with the plaintext data key as passphrase, return the
//      wrapped data key alongside the ciphertext.
//   2. Decrypt: ask the key service to unwrap `encryptedDataKey`, then open
//      the payload with the recovered data key.
//
// The plaintext data key only lives in memory and is wiped on drop. Bulk
// payload bytes never transit the key service.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use zeroize::Zeroizing;

use super::args::{EncryptionArgs, ENCRYPTED_DATA_KEY, KMS_KEY_ARN};
use super::engine::EncryptionOutput;
use super::symmetric;
use super::CryptoError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A data key as issued by the key service.
pub struct DataKey {
    pub plaintext: Zeroizing<Vec<u8>>,
    pub wrapped: Vec<u8>,
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKey")
            .field("plaintext", &"[REDACTED]")
            .field("wrapped", &format!("{} bytes", self.wrapped.len()))
            .finish()
    }
}

/// Abstraction over the external key-management service, enabling the AWS
/// backend and in-memory doubles for testing. Calls are not retried here.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Issue a new data key protected by the managed key `key_id`.
    async fn generate_data_key(&self, key_id: &str) -> Result<DataKey, CryptoError>;

    /// Recover the plaintext of a previously wrapped data key.
    async fn decrypt_data_key(
        &self,
        wrapped: &[u8],
        key_id: Option<&str>,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
}

// ─── Engine ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct EnvelopeEngine {
    name: String,
    args: EncryptionArgs,
    key_service: Arc<dyn KeyService>,
}

impl EnvelopeEngine {
    pub const DEFAULT_NAME: &'static str = "KMSEncryption";

    pub fn new(key_service: Arc<dyn KeyService>) -> Self {
        Self::with_name(Self::DEFAULT_NAME, key_service)
    }

    pub fn with_name(name: impl Into<String>, key_service: Arc<dyn KeyService>) -> Self {
        Self {
            name: name.into(),
            args: EncryptionArgs::default(),
            key_service,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.name
    }

    pub fn configure(&mut self, args: EncryptionArgs) {
        self.args = args;
    }

    /// Managed key ARN required to encrypt.
    pub fn check_encrypt_ready(&self) -> Result<&str, CryptoError> {
        self.args
            .kms_key_arn()
            .ok_or_else(|| CryptoError::missing_option(KMS_KEY_ARN, &self.name))
    }

    /// Wrapped data key required to decrypt.
    pub fn check_decrypt_ready(&self) -> Result<&[u8], CryptoError> {
        self.args
            .encrypted_data_key()
            .ok_or_else(|| CryptoError::missing_option(ENCRYPTED_DATA_KEY, &self.name))
    }

    pub async fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptionOutput, CryptoError> {
        let key_id = self.check_encrypt_ready()?;

        let data_key = self.key_service.generate_data_key(key_id).await?;
        if data_key.wrapped.is_empty() {
            return Err(CryptoError::KeyService(
                "key service returned an empty wrapped data key".to_string(),
            ));
        }
        tracing::info!(key_id = %key_id, "Generated data key");

        let encrypted_data = symmetric::seal(&data_key.plaintext, plaintext)?;
        Ok(EncryptionOutput::new(encrypted_data, data_key.wrapped))
    }

    pub async fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let wrapped = self.check_decrypt_ready()?;

        let data_key = self
            .key_service
            .decrypt_data_key(wrapped, self.args.kms_key_arn())
            .await?;
        tracing::info!("Unwrapped data key");

        symmetric::open(&data_key, data)
    }
}

impl fmt::Debug for EnvelopeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeEngine")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────

/// A key service double that keeps issued data keys in memory and counts
/// calls, so tests can assert that no request was made.
#[cfg(test)]
pub mod mock {
    use super::*;
    use rand::RngCore;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockKeyService {
        issued: Mutex<HashMap<Vec<u8>, (String, Vec<u8>)>>,
        generate_calls: AtomicUsize,
        decrypt_calls: AtomicUsize,
        unavailable: bool,
    }

    impl MockKeyService {
        pub fn new() -> Self {
            Self::default()
        }

        /// A service that rejects every call, like an unreachable endpoint.
        pub fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.generate_calls.load(Ordering::SeqCst) + self.decrypt_calls.load(Ordering::SeqCst)
        }

        pub fn generate_calls(&self) -> usize {
            self.generate_calls.load(Ordering::SeqCst)
        }

        pub fn decrypt_calls(&self) -> usize {
            self.decrypt_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyService for MockKeyService {
        async fn generate_data_key(&self, key_id: &str) -> Result<DataKey, CryptoError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            if self.unavailable {
                return Err(CryptoError::KeyService("service unavailable".to_string()));
            }

            let mut plaintext = vec![0u8; 32];
            let mut wrapped = vec![0u8; 48];
            rand::rng().fill_bytes(&mut plaintext);
            rand::rng().fill_bytes(&mut wrapped);

            self.issued
                .lock()
                .unwrap()
                .insert(wrapped.clone(), (key_id.to_string(), plaintext.clone()));

            Ok(DataKey {
                plaintext: Zeroizing::new(plaintext),
                wrapped,
            })
        }

        async fn decrypt_data_key(
            &self,
            wrapped: &[u8],
            key_id: Option<&str>,
        ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
            self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
            if self.unavailable {
                return Err(CryptoError::KeyService("service unavailable".to_string()));
            }

            let issued = self.issued.lock().unwrap();
            match issued.get(wrapped) {
                Some((owner, plaintext)) if key_id.map_or(true, |k| k == owner.as_str()) => {
                    Ok(Zeroizing::new(plaintext.clone()))
                }
                _ => Err(CryptoError::KeyService(
                    "InvalidCiphertextException".to_string(),
                )),
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
