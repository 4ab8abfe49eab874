//! Integration tests for the encrypted secret provider.
//!
//! Runs `KmsSecretProvider` over the real HTTP client against a wiremock
//! key-management service to verify request shape, per-request decryption
//! and error categorization.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use std::{sync::Arc, time::Duration};

use hubsync_core::{ExternalFailure, SecretError};
use hubsync_secrets::{
    HttpKmsClient, KmsClientConfig, KmsSecretProvider, KmsSecretSettings, SecretProvider,
};
use serde_json::json;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

const KEY: &str = "projects/demo/locations/global/keyRings/hooks/cryptoKeys/autoupdate";

fn provider_for(server: &MockServer) -> KmsSecretProvider {
    let client = HttpKmsClient::new(KmsClientConfig {
        endpoint: server.uri(),
        timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .expect("Failed to create client");

    KmsSecretProvider::new(Arc::new(client), KmsSecretSettings {
        crypto_key_id: Some(KEY.to_string()),
        webhook_secret_ciphertext: Some("Y3Qtd2ViaG9vaw==".to_string()),
        api_token_ciphertext: Some("Y3QtdG9rZW4=".to_string()),
    })
}

async fn mount_decrypt(server: &MockServer, ciphertext: &str, plaintext_b64: &str) {
    Mock::given(matchers::method("POST"))
        .and(matchers::path(format!("/v1/{KEY}:decrypt")))
        .and(matchers::body_json(json!({ "ciphertext": ciphertext })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plaintext": plaintext_b64,
            "usedPrimary": true,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolves_both_secrets_from_service() {
    let server = MockServer::start().await;
    // base64("shared-secret\n") and base64("ghp_abc123")
    mount_decrypt(&server, "Y3Qtd2ViaG9vaw==", "c2hhcmVkLXNlY3JldAo=").await;
    mount_decrypt(&server, "Y3QtdG9rZW4=", "Z2hwX2FiYzEyMw==").await;

    let secrets = provider_for(&server).resolve().await.expect("resolve should succeed");

    assert_eq!(secrets.webhook_secret.expose(), b"shared-secret");
    assert_eq!(secrets.api_token.expect("token expected").expose(), b"ghp_abc123");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn every_resolve_hits_the_service() {
    let server = MockServer::start().await;
    mount_decrypt(&server, "Y3Qtd2ViaG9vaw==", "YQ==").await;
    mount_decrypt(&server, "Y3QtdG9rZW4=", "Yg==").await;

    let provider = provider_for(&server);
    for _ in 0..3 {
        provider.resolve().await.expect("resolve should succeed");
    }

    assert_eq!(server.received_requests().await.unwrap().len(), 6);
}

#[tokio::test]
async fn malformed_base64_plaintext_is_malformed_error() {
    let server = MockServer::start().await;
    mount_decrypt(&server, "Y3Qtd2ViaG9vaw==", "!!definitely not base64!!").await;
    mount_decrypt(&server, "Y3QtdG9rZW4=", "Yg==").await;

    let error = provider_for(&server).resolve().await.unwrap_err();

    assert!(matches!(error, SecretError::ExternalService { kind: ExternalFailure::Malformed, .. }));
    assert!(!error.is_transient());
}

#[tokio::test]
async fn service_outage_is_transient() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let error = provider_for(&server).resolve().await.unwrap_err();

    assert!(error.is_transient());
    assert_eq!(server.received_requests().await.unwrap().len(), 1, "no retry expected");
}

#[tokio::test]
async fn unreachable_service_is_transient() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);
    drop(server);

    let error = provider.resolve().await.unwrap_err();
    assert!(error.is_transient(), "got {error:?}");
}
