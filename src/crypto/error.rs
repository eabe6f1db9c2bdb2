// EB Env Backup: Crypto error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: ciphertext was tampered with, corrupted, or the key is wrong")]
    Authentication,

    #[error("Malformed ciphertext: {0} bytes is shorter than nonce plus tag")]
    MalformedCiphertext(usize),

    #[error("Key service error: {0}")]
    KeyService(String),

    #[error("Cipher error: {0}")]
    Cipher(String),
}

impl CryptoError {
    pub(crate) fn missing_option(option: &str, method: &str) -> Self {
        CryptoError::Configuration(format!(
            "option '{}' is required by encryption method '{}'",
            option, method
        ))
    }
}
