//! Key-management service mock for decrypt calls.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hubsync_secrets::{HttpKmsClient, KmsClientConfig};
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Crypto key id used by the mock.
pub const TEST_CRYPTO_KEY_ID: &str =
    "projects/hubsync-test/locations/global/keyRings/webhooks/cryptoKeys/secrets";

/// Wiremock server speaking the KMS decrypt REST shape.
pub struct MockKms {
    server: MockServer,
}

impl MockKms {
    /// Starts a new mock server on a random port.
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Returns the base URL of the mock server.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    fn decrypt_path() -> String {
        format!("/v1/{TEST_CRYPTO_KEY_ID}:decrypt")
    }

    /// Decrypts `ciphertext` to `plaintext`, base64-encoding it the way the
    /// service does.
    pub async fn decrypts(&self, ciphertext: &str, plaintext: &str) {
        self.decrypts_raw(ciphertext, &STANDARD.encode(plaintext)).await;
    }

    /// Answers `ciphertext` with a `plaintext` field taken verbatim.
    pub async fn decrypts_raw(&self, ciphertext: &str, plaintext_field: &str) {
        Mock::given(method("POST"))
            .and(path(Self::decrypt_path()))
            .and(body_json(json!({ "ciphertext": ciphertext })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "plaintext": plaintext_field,
            })))
            .mount(&self.server)
            .await;
    }

    /// Fails every decrypt with `status`.
    pub async fn fails_with(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(Self::decrypt_path()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Delays every decrypt response by `delay`.
    pub async fn responds_slowly(&self, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(Self::decrypt_path()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "plaintext": STANDARD.encode("late") }))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of decrypt requests received so far.
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |requests| requests.len())
    }

    /// Client configuration pointing at this mock.
    pub fn client_config(&self) -> KmsClientConfig {
        KmsClientConfig {
            endpoint: self.url(),
            timeout: Duration::from_secs(2),
            ..KmsClientConfig::default()
        }
    }

    /// HTTP client pointing at this mock.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    pub fn client(&self) -> HttpKmsClient {
        HttpKmsClient::new(self.client_config()).expect("Failed to create KMS client")
    }
}
