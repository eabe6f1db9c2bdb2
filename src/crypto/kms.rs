// EB Env Backup: AWS KMS key service
//
// GenerateDataKey (AES_256) issues the data key; Decrypt unwraps it. The
// client is built on first use so runs that never touch KMS never load AWS
// configuration.

use async_trait::async_trait;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::operation::decrypt::DecryptOutput;
use aws_sdk_kms::operation::generate_data_key::GenerateDataKeyOutput;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::DataKeySpec;
use aws_sdk_kms::Client;
use tokio::sync::OnceCell;
use zeroize::Zeroizing;

use super::envelope::{DataKey, KeyService};
use super::CryptoError;
use crate::aws::AwsSettings;

pub struct AwsKmsKeyService {
    settings: AwsSettings,
    client: OnceCell<Client>,
}

impl AwsKmsKeyService {
    pub fn new(settings: AwsSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                tracing::debug!("Loading AWS configuration for KMS");
                Client::new(&self.settings.load().await)
            })
            .await
    }
}

#[async_trait]
impl KeyService for AwsKmsKeyService {
    async fn generate_data_key(&self, key_id: &str) -> Result<DataKey, CryptoError> {
        let response = self
            .client()
            .await
            .generate_data_key()
            .key_id(key_id)
            .key_spec(DataKeySpec::Aes256)
            .send()
            .await
            .map_err(|e| {
                CryptoError::KeyService(format!(
                    "GenerateDataKey for '{}' failed: {}",
                    key_id,
                    DisplayErrorContext(&e)
                ))
            })?;

        data_key_from(&response)
    }

    async fn decrypt_data_key(
        &self,
        wrapped: &[u8],
        key_id: Option<&str>,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let response = self
            .client()
            .await
            .decrypt()
            .ciphertext_blob(Blob::new(wrapped.to_vec()))
            .set_key_id(key_id.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                CryptoError::KeyService(format!("Decrypt failed: {}", DisplayErrorContext(&e)))
            })?;

        plaintext_from(&response)
    }
}

// ─── Response Mapping ────────────────────────────────────────────────────────

fn data_key_from(output: &GenerateDataKeyOutput) -> Result<DataKey, CryptoError> {
    let plaintext = output.plaintext().ok_or_else(|| {
        CryptoError::KeyService("GenerateDataKey response contained no plaintext".to_string())
    })?;
    let wrapped = output.ciphertext_blob().ok_or_else(|| {
        CryptoError::KeyService("GenerateDataKey response contained no ciphertext blob".to_string())
    })?;

    Ok(DataKey {
        plaintext: Zeroizing::new(plaintext.as_ref().to_vec()),
        wrapped: wrapped.as_ref().to_vec(),
    })
}

fn plaintext_from(output: &DecryptOutput) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let plaintext = output.plaintext().ok_or_else(|| {
        CryptoError::KeyService("Decrypt response contained no plaintext".to_string())
    })?;

    Ok(Zeroizing::new(plaintext.as_ref().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(plaintext: Option<&[u8]>, wrapped: Option<&[u8]>) -> GenerateDataKeyOutput {
        GenerateDataKeyOutput::builder()
            .set_plaintext(plaintext.map(|p| Blob::new(p.to_vec())))
            .set_ciphertext_blob(wrapped.map(|w| Blob::new(w.to_vec())))
            .key_id("arn:aws:kms:eu-west-1:123456789012:key/test")
            .build()
    }

    #[test]
    fn test_generated_key_maps_both_parts() {
        let data_key = data_key_from(&generated(Some(&[7u8; 32]), Some(&[9u8; 48]))).unwrap();

        assert_eq!(data_key.plaintext.as_slice(), &[7u8; 32]);
        assert_eq!(data_key.wrapped, vec![9u8; 48]);
    }

    #[test]
    fn test_generated_key_without_plaintext_is_key_service_error() {
        let result = data_key_from(&generated(None, Some(&[9u8; 48])));
        assert!(matches!(
            result,
            Err(CryptoError::KeyService(msg)) if msg.contains("no plaintext")
        ));
    }

    #[test]
    fn test_generated_key_without_blob_is_key_service_error() {
        let result = data_key_from(&generated(Some(&[7u8; 32]), None));
        assert!(matches!(
            result,
            Err(CryptoError::KeyService(msg)) if msg.contains("no ciphertext blob")
        ));
    }

    #[test]
    fn test_decrypt_response_mapping() {
        let output = DecryptOutput::builder()
            .plaintext(Blob::new(vec![5u8; 32]))
            .build();
        assert_eq!(plaintext_from(&output).unwrap().as_slice(), &[5u8; 32]);

        let empty = DecryptOutput::builder().build();
        assert!(matches!(
            plaintext_from(&empty),
            Err(CryptoError::KeyService(_))
        ));
    }
}
