//! Secret providers for the two deployment variants.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hubsync_core::{EncryptedSecretBundle, ResolvedSecrets, Secret, SecretError};
use secrecy::{zeroize::Zeroize, ExposeSecret, SecretString};
use tracing::debug;

use crate::kms::KmsClient;

/// Resolves the secrets needed to authenticate and act on one request.
///
/// Implementations are selected once at startup and shared across
/// requests; `resolve` is called afresh for every request.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Resolves the webhook secret and, where applicable, the API token.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Config` when required configuration is missing
    /// and `SecretError::ExternalService` when a remote call fails.
    async fn resolve(&self) -> Result<ResolvedSecrets, SecretError>;

    /// Short name of the variant, for logs.
    fn variant(&self) -> &'static str;
}

/// Plain signing secret taken from configuration.
pub struct EnvSecretProvider {
    secret_token: Option<SecretString>,
}

impl EnvSecretProvider {
    /// Creates a provider for the configured token.
    ///
    /// A missing token is reported on `resolve`, not here, so that the
    /// service still starts and answers with a server error.
    pub fn new(secret_token: Option<SecretString>) -> Self {
        Self { secret_token }
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn resolve(&self) -> Result<ResolvedSecrets, SecretError> {
        match &self.secret_token {
            Some(token) if !token.expose_secret().is_empty() => {
                Ok(ResolvedSecrets::signing_only(Secret::from(token.expose_secret())))
            },
            _ => Err(SecretError::config("SECRET_TOKEN is not set")),
        }
    }

    fn variant(&self) -> &'static str {
        "env"
    }
}

/// Key and ciphertexts for the encrypted variant.
#[derive(Debug, Clone, Default)]
pub struct KmsSecretSettings {
    /// Resource identifier of the crypto key used for both ciphertexts.
    pub crypto_key_id: Option<String>,
    /// Encrypted webhook signing secret.
    pub webhook_secret_ciphertext: Option<String>,
    /// Encrypted API token for the update collaborator.
    pub api_token_ciphertext: Option<String>,
}

impl KmsSecretSettings {
    fn bundle(
        &self,
        ciphertext: Option<&String>,
        setting: &str,
    ) -> Result<EncryptedSecretBundle, SecretError> {
        let key = non_empty(self.crypto_key_id.as_ref())
            .ok_or_else(|| SecretError::config("KMS_CRYPTO_KEY_ID is not set"))?;
        let ciphertext =
            non_empty(ciphertext).ok_or_else(|| SecretError::config(format!("{setting} is not set")))?;

        Ok(EncryptedSecretBundle::new(key, ciphertext))
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Secrets decrypted through a key-management service on every request.
pub struct KmsSecretProvider {
    client: Arc<dyn KmsClient>,
    settings: KmsSecretSettings,
}

impl KmsSecretProvider {
    /// Creates a provider using the given client and settings.
    pub fn new(client: Arc<dyn KmsClient>, settings: KmsSecretSettings) -> Self {
        Self { client, settings }
    }

    async fn decrypt(&self, bundle: &EncryptedSecretBundle) -> Result<Secret, SecretError> {
        let plaintext = self.client.decrypt(bundle).await?;
        decode_plaintext(&plaintext)
    }
}

#[async_trait]
impl SecretProvider for KmsSecretProvider {
    async fn resolve(&self) -> Result<ResolvedSecrets, SecretError> {
        let webhook_bundle = self
            .settings
            .bundle(self.settings.webhook_secret_ciphertext.as_ref(), "WEBHOOK_SECRET_CIPHERTEXT")?;
        let token_bundle = self
            .settings
            .bundle(self.settings.api_token_ciphertext.as_ref(), "API_TOKEN_CIPHERTEXT")?;

        let webhook_secret = self.decrypt(&webhook_bundle).await?;
        let api_token = self.decrypt(&token_bundle).await?;

        debug!("Resolved webhook secret and API token");
        Ok(ResolvedSecrets::with_api_token(webhook_secret, api_token))
    }

    fn variant(&self) -> &'static str {
        "kms"
    }
}

/// Decodes a base64 plaintext returned by the service into a secret.
///
/// The decoded bytes must be UTF-8; surrounding whitespace (typically a
/// trailing newline from `echo`-encrypted secrets) is trimmed. Intermediate
/// buffers are zeroized.
///
/// # Errors
///
/// Returns `SecretError::ExternalService` with kind `Malformed` for invalid
/// base64 or non-UTF-8 content.
pub fn decode_plaintext(plaintext: &SecretString) -> Result<Secret, SecretError> {
    let bytes = STANDARD
        .decode(plaintext.expose_secret().trim())
        .map_err(|e| SecretError::malformed(format!("plaintext is not valid base64: {e}")))?;

    let mut text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            return Err(SecretError::malformed("plaintext is not valid UTF-8"));
        },
    };

    let secret = Secret::from(text.trim());
    text.zeroize();
    Ok(secret)
}
