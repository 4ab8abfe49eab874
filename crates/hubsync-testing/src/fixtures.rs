//! Webhook request builders and payload fixtures.

use axum::body::Body;
use bytes::Bytes;
use http::{Method, Request};
use hubsync_api::crypto::signature_header_value;
use serde_json::{json, Value};

/// Builds a GitHub `push` payload for `repository`.
pub fn push_payload(repository: &str) -> Value {
    json!({
        "ref": "refs/heads/main",
        "before": "6113728f27ae82c7b1a177c8d03f9e96e0adf246",
        "after": "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c",
        "repository": {
            "name": repository,
            "full_name": format!("example/{repository}"),
            "private": false,
        },
        "pusher": { "name": "octocat" },
    })
}

/// Returns `sha1=<hex>` for `body` under `secret`.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    signature_header_value(secret.as_bytes(), body)
}

/// Builder for inbound webhook requests.
#[derive(Debug, Clone)]
pub struct WebhookBuilder {
    path: String,
    body: Bytes,
    signature: Option<String>,
    event: Option<String>,
    delivery: Option<String>,
}

impl WebhookBuilder {
    /// Creates an unsigned `POST /` with an empty body.
    pub fn new() -> Self {
        Self {
            path: "/".to_string(),
            body: Bytes::new(),
            signature: None,
            event: None,
            delivery: None,
        }
    }

    /// Creates an unsigned push webhook for `repository`.
    pub fn push(repository: &str) -> Self {
        Self::new()
            .json(&push_payload(repository))
            .event("push")
            .delivery("72d3162e-cc78-11e3-81ab-4c9367dc0958")
    }

    /// Sets the request path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body.
    pub fn json(self, value: &Value) -> Self {
        self.body(value.to_string())
    }

    /// Signs the current body with `secret`.
    pub fn signed_with(mut self, secret: &str) -> Self {
        self.signature = Some(sign_body(secret, &self.body));
        self
    }

    /// Sets the signature header verbatim.
    pub fn signature(mut self, value: impl Into<String>) -> Self {
        self.signature = Some(value.into());
        self
    }

    /// Sets `X-GitHub-Event`.
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Sets `X-GitHub-Delivery`.
    pub fn delivery(mut self, delivery: impl Into<String>) -> Self {
        self.delivery = Some(delivery.into());
        self
    }

    /// Current body.
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Builds the HTTP request.
    ///
    /// # Panics
    ///
    /// Panics if a header value is not valid.
    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.path)
            .header("content-type", "application/json");

        if let Some(signature) = self.signature {
            builder = builder.header("x-hub-signature", signature);
        }
        if let Some(event) = self.event {
            builder = builder.header("x-github-event", event);
        }
        if let Some(delivery) = self.delivery {
            builder = builder.header("x-github-delivery", delivery);
        }

        builder.body(Body::from(self.body)).expect("Failed to build webhook request")
    }
}

impl Default for WebhookBuilder {
    fn default() -> Self {
        Self::new()
    }
}
