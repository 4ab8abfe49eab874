//! Request-scoped domain models.
//!
//! Defines the immutable snapshot of an inbound webhook, the encrypted
//! secret bundles handed to the key-management service, and the resolved
//! secret set. Nothing here is persisted; every value lives for one request.

use bytes::Bytes;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::{error::PayloadError, secret::Secret};

/// Header carrying `<algorithm>=<hexDigest>`.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Header naming the event type (`push`, `ping`, ...).
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying the sender's unique delivery identifier.
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Immutable snapshot of an inbound webhook request.
///
/// The body is kept exactly as received. Signature computation always uses
/// [`WebhookRequest::body`]; payload inspection parses a borrowed view and
/// never re-serializes it.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    body: Bytes,
    headers: HeaderMap,
}

impl WebhookRequest {
    /// Creates a snapshot from the raw body and headers.
    pub fn new(headers: HeaderMap, body: Bytes) -> Self {
        Self { body, headers }
    }

    /// Raw request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// All request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of the signature header, if present and valid visible ASCII.
    pub fn signature(&self) -> Option<&str> {
        self.header_str(SIGNATURE_HEADER)
    }

    /// Event type announced by the sender.
    pub fn event(&self) -> Option<&str> {
        self.header_str(EVENT_HEADER)
    }

    /// Delivery identifier announced by the sender.
    pub fn delivery_id(&self) -> Option<&str> {
        self.header_str(DELIVERY_HEADER)
    }

    /// Extracts `repository.name` from the JSON payload.
    ///
    /// Used for logging only; callers must not fail the request on error.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::InvalidJson` if the body does not parse and
    /// `PayloadError::MissingRepositoryName` if the field is absent.
    pub fn repository_name(&self) -> Result<String, PayloadError> {
        let payload: PushPayload = serde_json::from_slice(&self.body)
            .map_err(|e| PayloadError::InvalidJson(e.to_string()))?;

        payload.repository.map(|r| r.name).ok_or(PayloadError::MissingRepositoryName)
    }

    fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    repository: Option<RepositoryRef>,
}

#[derive(Debug, Deserialize)]
struct RepositoryRef {
    name: String,
}

/// Ciphertext that must be decrypted by the key-management service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecretBundle {
    /// Full resource identifier of the crypto key.
    pub crypto_key_id: String,
    /// Base64 ciphertext as produced by the service's encrypt call.
    pub ciphertext: String,
}

impl EncryptedSecretBundle {
    /// Creates a bundle for the given key and ciphertext.
    pub fn new(crypto_key_id: impl Into<String>, ciphertext: impl Into<String>) -> Self {
        Self { crypto_key_id: crypto_key_id.into(), ciphertext: ciphertext.into() }
    }
}

/// Secrets resolved for a single request.
#[derive(Debug)]
pub struct ResolvedSecrets {
    /// Key for the webhook signature.
    pub webhook_secret: Secret,
    /// Token handed to the update collaborator; only set for encrypted
    /// secret deployments.
    pub api_token: Option<Secret>,
}

impl ResolvedSecrets {
    /// Secrets consisting of a signing secret only.
    pub fn signing_only(webhook_secret: Secret) -> Self {
        Self { webhook_secret, api_token: None }
    }

    /// Signing secret plus API token.
    pub fn with_api_token(webhook_secret: Secret, api_token: Secret) -> Self {
        Self { webhook_secret, api_token: Some(api_token) }
    }
}
