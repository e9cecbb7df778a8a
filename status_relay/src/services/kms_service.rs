//! KMS decryption of secrets stored (base64-encoded) in the environment.

use async_trait::async_trait;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::SecretToken;
use crate::error::ConfigError;

/// Something that can turn a KMS ciphertext back into plaintext.
#[async_trait]
pub trait SecretDecryptor: Send + Sync {
    async fn decrypt(&self, ciphertext: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// AWS KMS backed decryptor.
pub struct KmsDecryptor {
    client: aws_sdk_kms::Client,
}

impl KmsDecryptor {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_kms::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SecretDecryptor for KmsDecryptor {
    async fn decrypt(&self, ciphertext: &[u8]) -> anyhow::Result<Vec<u8>> {
        let output = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(ciphertext))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(e)))?;

        let plaintext = output
            .plaintext()
            .ok_or_else(|| anyhow::anyhow!("KMS returned no plaintext"))?;
        Ok(plaintext.as_ref().to_vec())
    }
}

/// Decode and decrypt a base64 KMS ciphertext read from `key`.
///
/// Surrounding whitespace in the plaintext is dropped.
pub async fn decrypt_secret(
    decryptor: &dyn SecretDecryptor,
    key: &'static str,
    encoded: &str,
) -> Result<SecretToken, ConfigError> {
    let ciphertext = STANDARD
        .decode(encoded.trim())
        .map_err(|source| ConfigError::Base64 { key, source })?;
    if ciphertext.is_empty() {
        return Err(ConfigError::Missing(key));
    }

    let plaintext = decryptor
        .decrypt(&ciphertext)
        .await
        .map_err(|e| ConfigError::Decrypt {
            key,
            reason: format!("{e:#}"),
        })?;

    let text = String::from_utf8(plaintext).map_err(|_| ConfigError::Decrypt {
        key,
        reason: "plaintext is not valid UTF-8".to_string(),
    })?;

    let secret = text.trim();
    if secret.is_empty() {
        return Err(ConfigError::Decrypt {
            key,
            reason: "plaintext is empty".to_string(),
        });
    }

    tracing::debug!(key, "Secret decrypted");
    Ok(SecretToken::new(secret))
}
