// EB Env Backup: Encryption engine contract
//
// The backend set is closed, so engines are a tagged variant dispatched by a
// single match instead of trait objects. Names are only consulted at the
// configuration boundary (see `MethodRegistry`).

use super::args::EncryptionArgs;
use super::envelope::EnvelopeEngine;
use super::symmetric::SymmetricEngine;
use super::CryptoError;

/// Ciphertext plus the wrapped data key, if the method produced one.
///
/// Empty `encrypted_data_key` for the symmetric engine; always non-empty for
/// the envelope engine, where losing it makes the ciphertext unrecoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionOutput {
    encrypted_data: Vec<u8>,
    encrypted_data_key: Vec<u8>,
}

impl EncryptionOutput {
    pub fn new(encrypted_data: Vec<u8>, encrypted_data_key: Vec<u8>) -> Self {
        Self {
            encrypted_data,
            encrypted_data_key,
        }
    }

    pub fn encrypted_data(&self) -> &[u8] {
        &self.encrypted_data
    }

    pub fn encrypted_data_key(&self) -> &[u8] {
        &self.encrypted_data_key
    }

    pub fn has_data_key(&self) -> bool {
        !self.encrypted_data_key.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum Engine {
    Symmetric(SymmetricEngine),
    Envelope(EnvelopeEngine),
}

impl Engine {
    pub fn method_name(&self) -> &str {
        match self {
            Engine::Symmetric(e) => e.method_name(),
            Engine::Envelope(e) => e.method_name(),
        }
    }

    /// Replace the engine's arguments wholesale.
    pub fn configure(&mut self, args: EncryptionArgs) {
        match self {
            Engine::Symmetric(e) => e.configure(args),
            Engine::Envelope(e) => e.configure(args),
        }
    }

    /// Fail with a configuration error if encrypting would be impossible.
    /// Makes no external calls.
    pub fn check_encrypt_ready(&self) -> Result<(), CryptoError> {
        match self {
            Engine::Symmetric(e) => e.check_ready().map(|_| ()),
            Engine::Envelope(e) => e.check_encrypt_ready().map(|_| ()),
        }
    }

    /// Fail with a configuration error if decrypting would be impossible.
    /// Makes no external calls.
    pub fn check_decrypt_ready(&self) -> Result<(), CryptoError> {
        match self {
            Engine::Symmetric(e) => e.check_ready().map(|_| ()),
            Engine::Envelope(e) => e.check_decrypt_ready().map(|_| ()),
        }
    }

    pub async fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptionOutput, CryptoError> {
        match self {
            Engine::Symmetric(e) => e.encrypt(plaintext),
            Engine::Envelope(e) => e.encrypt(plaintext).await,
        }
    }

    pub async fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            Engine::Symmetric(e) => e.decrypt(data),
            Engine::Envelope(e) => e.decrypt(data).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::mock::MockKeyService;
    use std::sync::Arc;

    const SAMPLE_RECORD: &[u8] = br#"{"EnvironmentDetails":[{"EnvironmentName":"prod","EnvVarDetails":[{"VariableName":"DB_HOST","VariableValue":"db.example.com"}]}]}"#;

    #[tokio::test]
    async fn test_symmetric_dispatch_round_trip() {
        let mut engine = Engine::Symmetric(SymmetricEngine::new());
        engine.configure(EncryptionArgs::new().with_passphrase("correct-horse"));

        let output = engine.encrypt(SAMPLE_RECORD).await.unwrap();
        assert!(!output.has_data_key());
        assert_eq!(engine.decrypt(output.encrypted_data()).await.unwrap(), SAMPLE_RECORD);
    }

    #[tokio::test]
    async fn test_envelope_dispatch_round_trip() {
        let service = Arc::new(MockKeyService::new());
        let mut engine = Engine::Envelope(EnvelopeEngine::new(service.clone()));
        engine.configure(EncryptionArgs::new().with_kms_key_arn("arn:aws:kms:key/1"));

        let output = engine.encrypt(SAMPLE_RECORD).await.unwrap();
        assert!(output.has_data_key());

        engine.configure(
            EncryptionArgs::new().with_encrypted_data_key(output.encrypted_data_key()),
        );
        assert_eq!(engine.decrypt(output.encrypted_data()).await.unwrap(), SAMPLE_RECORD);
    }

    #[test]
    fn test_readiness_checks_follow_method() {
        let service = Arc::new(MockKeyService::new());
        let mut envelope = Engine::Envelope(EnvelopeEngine::new(service));
        envelope.configure(EncryptionArgs::new().with_kms_key_arn("arn:aws:kms:key/1"));

        assert!(envelope.check_encrypt_ready().is_ok());
        assert!(envelope.check_decrypt_ready().is_err());

        let symmetric = Engine::Symmetric(SymmetricEngine::new());
        assert!(symmetric.check_encrypt_ready().is_err());
        assert!(symmetric.check_decrypt_ready().is_err());
    }
}
