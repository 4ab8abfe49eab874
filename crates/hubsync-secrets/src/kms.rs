//! HTTP client for the key-management service decrypt call.
//!
//! Speaks the Cloud KMS REST shape: `POST {endpoint}/v1/{key}:decrypt` with
//! `{"ciphertext": "<base64>"}`, answered by `{"plaintext": "<base64>"}`.
//! Each call is a single attempt bounded by the configured timeout; failures
//! are categorized so the entry point can tell outages from bad responses.

use std::time::Duration;

use async_trait::async_trait;
use hubsync_core::{EncryptedSecretBundle, SecretError};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};

use crate::{DEFAULT_KMS_ENDPOINT, DEFAULT_KMS_TIMEOUT_SECONDS};

/// Configuration for the key-management client.
#[derive(Debug)]
pub struct KmsClientConfig {
    /// Base URL of the REST API, without the `/v1` suffix.
    pub endpoint: String,
    /// Timeout for one decrypt request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Bearer token presented to the service, if it requires one.
    pub access_token: Option<SecretString>,
}

impl Default for KmsClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_KMS_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_KMS_TIMEOUT_SECONDS),
            user_agent: concat!("hubsync/", env!("CARGO_PKG_VERSION")).to_string(),
            access_token: None,
        }
    }
}

/// Remote decryption collaborator.
#[async_trait]
pub trait KmsClient: Send + Sync {
    /// Decrypts one bundle and returns the service's base64 `plaintext`.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::ExternalService` when the call fails or the
    /// response cannot be decoded.
    async fn decrypt(&self, bundle: &EncryptedSecretBundle) -> Result<SecretString, SecretError>;
}

#[derive(Serialize)]
struct DecryptRequest<'a> {
    ciphertext: &'a str,
}

#[derive(Deserialize)]
struct DecryptResponse {
    plaintext: String,
}

/// reqwest-backed [`KmsClient`].
#[derive(Debug)]
pub struct HttpKmsClient {
    client: reqwest::Client,
    config: KmsClientConfig,
}

impl HttpKmsClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Config` if the HTTP client cannot be built.
    pub fn new(config: KmsClientConfig) -> Result<Self, SecretError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| SecretError::config(format!("failed to build KMS HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Creates a new client with default configuration.
    pub fn with_defaults() -> Result<Self, SecretError> {
        Self::new(KmsClientConfig::default())
    }

    fn decrypt_url(&self, crypto_key_id: &str) -> String {
        format!("{}/v1/{}:decrypt", self.config.endpoint.trim_end_matches('/'), crypto_key_id)
    }
}

#[async_trait]
impl KmsClient for HttpKmsClient {
    async fn decrypt(&self, bundle: &EncryptedSecretBundle) -> Result<SecretString, SecretError> {
        let span = info_span!("kms_decrypt", crypto_key_id = %bundle.crypto_key_id);

        async move {
            let start_time = std::time::Instant::now();

            let mut request = self
                .client
                .post(self.decrypt_url(&bundle.crypto_key_id))
                .json(&DecryptRequest { ciphertext: &bundle.ciphertext });

            if let Some(token) = &self.config.access_token {
                request = request.bearer_auth(token.expose_secret());
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(
                        duration_ms = start_time.elapsed().as_millis(),
                        "Decrypt request failed: {}",
                        e
                    );

                    if e.is_timeout() {
                        return Err(SecretError::unavailable(format!(
                            "decrypt request timed out after {}s",
                            self.config.timeout.as_secs()
                        )));
                    }
                    if e.is_connect() {
                        return Err(SecretError::unavailable(format!("connection failed: {e}")));
                    }
                    return Err(SecretError::unavailable(e.to_string()));
                },
            };

            let status = response.status();
            tracing::debug!(
                status = status.as_u16(),
                duration_ms = start_time.elapsed().as_millis(),
                "Received decrypt response"
            );

            if !status.is_success() {
                return Err(categorize_status(status));
            }

            let decoded: DecryptResponse = response
                .json()
                .await
                .map_err(|e| SecretError::malformed(format!("unreadable decrypt response: {e}")))?;

            Ok(SecretString::from(decoded.plaintext))
        }
        .instrument(span)
        .await
    }
}

/// Maps a non-success status to a secret error.
///
/// Throttling and server errors are transient; anything else means the
/// service refused the request (unknown key, missing permission).
fn categorize_status(status: StatusCode) -> SecretError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        SecretError::unavailable(format!("HTTP {}", status.as_u16()))
    } else {
        SecretError::rejected(format!("HTTP {}", status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use hubsync_core::ExternalFailure;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    const KEY: &str = "projects/p/locations/global/keyRings/hooks/cryptoKeys/webhook";

    fn client_for(server: &MockServer) -> HttpKmsClient {
        HttpKmsClient::new(KmsClientConfig { endpoint: server.uri(), ..Default::default() })
            .unwrap()
    }

    fn kind_of(error: &SecretError) -> Option<ExternalFailure> {
        match error {
            SecretError::ExternalService { kind, .. } => Some(*kind),
            SecretError::Config { .. } => None,
        }
    }

    #[tokio::test]
    async fn successful_decrypt_returns_plaintext() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path(format!("/v1/{KEY}:decrypt")))
            .and(matchers::body_json(serde_json::json!({ "ciphertext": "Y2lwaGVy" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "plaintext": "c2VjcmV0" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let plaintext =
            client_for(&server).decrypt(&EncryptedSecretBundle::new(KEY, "Y2lwaGVy")).await.unwrap();

        assert_eq!(plaintext.expose_secret(), "c2VjcmV0");
    }

    #[tokio::test]
    async fn access_token_sent_as_bearer() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::header("authorization", "Bearer ya29.token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "plaintext": "" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpKmsClient::new(KmsClientConfig {
            endpoint: server.uri(),
            access_token: Some(SecretString::from("ya29.token")),
            ..Default::default()
        })
        .unwrap();

        assert!(client.decrypt(&EncryptedSecretBundle::new(KEY, "x")).await.is_ok());
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let error =
            client_for(&server).decrypt(&EncryptedSecretBundle::new(KEY, "x")).await.unwrap_err();

        assert_eq!(kind_of(&error), Some(ExternalFailure::Unavailable));
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn permission_denied_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let error =
            client_for(&server).decrypt(&EncryptedSecretBundle::new(KEY, "x")).await.unwrap_err();

        assert_eq!(kind_of(&error), Some(ExternalFailure::Rejected));
    }

    #[tokio::test]
    async fn missing_plaintext_field_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": KEY })),
            )
            .mount(&server)
            .await;

        let error =
            client_for(&server).decrypt(&EncryptedSecretBundle::new(KEY, "x")).await.unwrap_err();

        assert_eq!(kind_of(&error), Some(ExternalFailure::Malformed));
    }

    #[tokio::test]
    async fn slow_service_times_out_as_unavailable() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "plaintext": "c2VjcmV0" }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = HttpKmsClient::new(KmsClientConfig {
            endpoint: server.uri(),
            timeout: Duration::from_millis(100),
            ..Default::default()
        })
        .unwrap();

        let error = client.decrypt(&EncryptedSecretBundle::new(KEY, "x")).await.unwrap_err();
        assert_eq!(kind_of(&error), Some(ExternalFailure::Unavailable));
    }

    #[test]
    fn decrypt_url_strips_trailing_slash() {
        let client = HttpKmsClient::new(KmsClientConfig {
            endpoint: "https://kms.example.com/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            client.decrypt_url("projects/p/cryptoKeys/k"),
            "https://kms.example.com/v1/projects/p/cryptoKeys/k:decrypt"
        );
    }

    #[test]
    fn status_categories() {
        assert!(categorize_status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(categorize_status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(!categorize_status(StatusCode::NOT_FOUND).is_transient());
        assert!(!categorize_status(StatusCode::FORBIDDEN).is_transient());
    }
}
