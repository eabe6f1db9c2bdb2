// EB Env Backup: Crypto Module
//
// Pluggable envelope encryption. Two engines share one contract:
//   - symmetric: AES-256-GCM under a key derived from a passphrase
//   - envelope:  a KMS-issued data key drives the symmetric engine, and the
//                wrapped form of that key is returned for persistence

mod args;
mod engine;
mod envelope;
mod error;
mod key;
mod kms;
mod registry;
mod symmetric;

pub use args::{EncryptionArgs, ENCRYPTED_DATA_KEY, KMS_KEY_ARN, PASSPHRASE};
pub use engine::{Engine, EncryptionOutput};
pub use envelope::{DataKey, EnvelopeEngine, KeyService};
pub use error::CryptoError;
pub use key::{derive_key, KEY_LEN};
pub use kms::AwsKmsKeyService;
pub use registry::MethodRegistry;
pub use symmetric::{SymmetricEngine, NONCE_LEN, TAG_LEN};

#[cfg(test)]
pub use envelope::mock;
