// EB Env Backup: Symmetric AEAD Engine
//
// AES-256-GCM under a digest-derived key. Artifact layout:
//
//   nonce (12 bytes) || ciphertext || tag (16 bytes)
//
// A fresh nonce is drawn from the CSPRNG for every seal; reusing a nonce under
// the same key breaks both confidentiality and authentication for GCM.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;

use super::args::{EncryptionArgs, PASSPHRASE};
use super::engine::EncryptionOutput;
use super::key::derive_key;
use super::CryptoError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

// ─── Primitives ──────────────────────────────────────────────────────────────

fn cipher_for(passphrase: &[u8]) -> Aes256Gcm {
    let key = derive_key(passphrase);
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()))
}

/// Seal `plaintext` under `passphrase` and prefix the random nonce.
pub(crate) fn seal(passphrase: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(passphrase);

    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);

    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Cipher(format!("AES-GCM seal failed: {}", e)))?;

    let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Split off the nonce and authenticate-then-decrypt the remainder.
pub(crate) fn open(passphrase: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::MalformedCiphertext(data.len()));
    }

    let (nonce, sealed) = data.split_at(NONCE_LEN);
    cipher_for(passphrase)
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| CryptoError::Authentication)
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Direct-passphrase engine. Never produces a key artifact: the passphrase
/// itself is the only key material and it is never persisted.
#[derive(Debug, Clone)]
pub struct SymmetricEngine {
    name: String,
    args: EncryptionArgs,
}

impl SymmetricEngine {
    pub const DEFAULT_NAME: &'static str = "AESCipherEncryption";

    pub fn new() -> Self {
        Self::with_name(Self::DEFAULT_NAME)
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: EncryptionArgs::default(),
        }
    }

    pub fn method_name(&self) -> &str {
        &self.name
    }

    pub fn configure(&mut self, args: EncryptionArgs) {
        self.args = args;
    }

    /// The configured passphrase, or a configuration error naming the option.
    pub fn check_ready(&self) -> Result<&[u8], CryptoError> {
        self.args
            .passphrase()
            .ok_or_else(|| CryptoError::missing_option(PASSPHRASE, &self.name))
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptionOutput, CryptoError> {
        let passphrase = self.check_ready()?;
        let encrypted_data = seal(passphrase, plaintext)?;
        tracing::debug!(
            method = %self.name,
            plaintext_len = plaintext.len(),
            "Sealed payload"
        );
        Ok(EncryptionOutput::new(encrypted_data, Vec::new()))
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let passphrase = self.check_ready()?;
        open(passphrase, data)
    }
}

impl Default for SymmetricEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SAMPLE_RECORD: &str = r#"{"EnvironmentDetails":[{"EnvironmentName":"prod","EnvVarDetails":[{"VariableName":"DB_HOST","VariableValue":"db.example.com"}]}]}"#;

    // Produced independently with AES-256-GCM, key = hex(MD5("correct-horse")),
    // nonce = 00..0b, plaintext = "DB_HOST=db.example.com".
    const LEGACY_VECTOR: &str = "000102030405060708090a0baeb69841c6f2b2821d9ea15b279d17c436a3f1b04c11162db60fb2e57d7b6e980111b2632483";

    fn from_hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn engine(passphrase: &str) -> SymmetricEngine {
        let mut engine = SymmetricEngine::new();
        engine.configure(EncryptionArgs::new().with_passphrase(passphrase));
        engine
    }

    #[test]
    fn test_round_trip_sample_record() {
        let engine = engine("correct-horse");
        let output = engine.encrypt(SAMPLE_RECORD.as_bytes()).unwrap();

        assert!(output.encrypted_data_key().is_empty());
        assert_eq!(
            output.encrypted_data().len(),
            NONCE_LEN + SAMPLE_RECORD.len() + TAG_LEN
        );

        let plaintext = engine.decrypt(output.encrypted_data()).unwrap();
        assert_eq!(plaintext, SAMPLE_RECORD.as_bytes());
    }

    #[test]
    fn test_round_trip_various_sizes() {
        let engine = engine("s3cret");
        for size in [1usize, 15, 16, 17, 255, 4096] {
            let payload: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            let output = engine.encrypt(&payload).unwrap();
            assert_eq!(engine.decrypt(output.encrypted_data()).unwrap(), payload);
        }
    }

    #[test]
    fn test_decrypts_legacy_artifact() {
        let engine = engine("correct-horse");
        let plaintext = engine.decrypt(&from_hex(LEGACY_VECTOR)).unwrap();
        assert_eq!(plaintext, b"DB_HOST=db.example.com");
    }

    #[test]
    fn test_every_bit_flip_is_rejected() {
        let engine = engine("correct-horse");
        let sealed = engine.encrypt(b"tamper me").unwrap().encrypted_data().to_vec();

        for byte in 0..sealed.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered[byte] ^= 1 << bit;
                assert!(
                    matches!(engine.decrypt(&tampered), Err(CryptoError::Authentication)),
                    "flip of bit {} in byte {} must fail authentication",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_wrong_passphrase_is_rejected() {
        let sealed = engine("correct-horse").encrypt(b"payload").unwrap();
        let result = engine("battery-staple").decrypt(sealed.encrypted_data());
        assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    #[test]
    fn test_nonces_never_repeat() {
        let engine = engine("correct-horse");
        let mut nonces = HashSet::new();
        let mut ciphertexts = HashSet::new();

        for _ in 0..1000 {
            let output = engine.encrypt(b"same plaintext").unwrap();
            let data = output.encrypted_data();
            assert!(nonces.insert(data[..NONCE_LEN].to_vec()));
            assert!(ciphertexts.insert(data[NONCE_LEN..].to_vec()));
        }
    }

    #[test]
    fn test_missing_passphrase_is_configuration_error() {
        let engine = SymmetricEngine::new();
        assert!(matches!(
            engine.encrypt(b"payload"),
            Err(CryptoError::Configuration(msg)) if msg.contains(PASSPHRASE)
        ));
        assert!(matches!(
            engine.decrypt(&[0u8; 64]),
            Err(CryptoError::Configuration(_))
        ));
    }

    #[test]
    fn test_truncated_input_is_malformed() {
        let engine = engine("correct-horse");
        let result = engine.decrypt(&[0u8; NONCE_LEN + TAG_LEN - 1]);
        assert!(matches!(result, Err(CryptoError::MalformedCiphertext(27))));
    }

    #[test]
    fn test_reconfigure_replaces_args_wholesale() {
        let mut engine = engine("first");
        let sealed = engine.encrypt(b"payload").unwrap();

        engine.configure(EncryptionArgs::new().with_kms_key_arn("arn:aws:kms:key"));
        assert!(matches!(
            engine.decrypt(sealed.encrypted_data()),
            Err(CryptoError::Configuration(_))
        ));
    }
}
