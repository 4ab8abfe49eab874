//! Secret resolution for webhook authentication.
//!
//! Resolves the webhook signing secret (and, for encrypted deployments, the
//! API token used by the update collaborator) once per request. Two
//! providers share the [`SecretProvider`] trait:
//!
//! - [`EnvSecretProvider`] returns a plain secret taken from configuration.
//! - [`KmsSecretProvider`] decrypts ciphertexts through a key-management
//!   service on every request; there is no cache, so a rotated secret takes
//!   effect on the next request.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hubsync_secrets::{
//!     HttpKmsClient, KmsClientConfig, KmsSecretProvider, KmsSecretSettings, SecretProvider,
//! };
//!
//! # async fn example() -> Result<(), hubsync_core::SecretError> {
//! let client = HttpKmsClient::new(KmsClientConfig::default())?;
//! let provider = KmsSecretProvider::new(Arc::new(client), KmsSecretSettings {
//!     crypto_key_id: Some("projects/p/locations/global/keyRings/r/cryptoKeys/k".into()),
//!     webhook_secret_ciphertext: Some("CiQA...".into()),
//!     api_token_ciphertext: Some("CiQA...".into()),
//! });
//!
//! let secrets = provider.resolve().await?;
//! assert!(secrets.api_token.is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod kms;
pub mod provider;

pub use kms::{HttpKmsClient, KmsClient, KmsClientConfig};
pub use provider::{
    decode_plaintext, EnvSecretProvider, KmsSecretProvider, KmsSecretSettings, SecretProvider,
};

/// Default per-call timeout for decrypt requests in seconds.
pub const DEFAULT_KMS_TIMEOUT_SECONDS: u64 = 10;

/// Default key-management REST endpoint.
pub const DEFAULT_KMS_ENDPOINT: &str = "https://cloudkms.googleapis.com";
