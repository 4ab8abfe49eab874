//! Webhook handler: resolve secrets, verify the signature, run the update.

use std::{sync::Arc, time::Duration};

use axum::{extract::State, http::HeaderMap};
use bytes::Bytes;
use hubsync_core::{
    HookError, ResolvedSecrets, SecretError, SubmoduleUpdater, UpdateError, WebhookRequest,
};
use hubsync_secrets::SecretProvider;
use tracing::{debug, error, info, instrument, warn};

use crate::{crypto::verify_signature, error::ApiError, AppState};

/// Body returned for a handled webhook.
pub const SUCCESS_BODY: &str = "ok";

/// Per-request deadlines for the two remote steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerTimeouts {
    /// Bound on secret resolution; expiry counts as the service being
    /// unavailable.
    pub secret: Duration,
    /// Bound on the update collaborator; expiry counts as a connection
    /// failure.
    pub update: Duration,
}

impl Default for HandlerTimeouts {
    fn default() -> Self {
        Self { secret: Duration::from_secs(10), update: Duration::from_secs(45) }
    }
}

/// Authenticates webhooks and drives the update collaborator.
///
/// Holds no mutable state. Secrets are resolved afresh for every request
/// and dropped when it completes.
#[derive(Clone)]
pub struct UpdateService {
    secrets: Arc<dyn SecretProvider>,
    updater: Arc<dyn SubmoduleUpdater>,
    timeouts: HandlerTimeouts,
}

impl UpdateService {
    /// Creates a service from its collaborators.
    pub fn new(
        secrets: Arc<dyn SecretProvider>,
        updater: Arc<dyn SubmoduleUpdater>,
        timeouts: HandlerTimeouts,
    ) -> Self {
        Self { secrets, updater, timeouts }
    }

    /// Name of the active secret provider.
    pub fn secret_variant(&self) -> &'static str {
        self.secrets.variant()
    }

    /// Handles one webhook end to end.
    ///
    /// The update runs only after the signature verified. Every failure is
    /// logged here before it is returned.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn process(&self, request: &WebhookRequest) -> Result<&'static str, HookError> {
        let secrets = self.resolve_secrets().await.inspect_err(|e| {
            if e.is_transient() {
                warn!(error = %e, "Secret resolution unavailable");
            } else {
                error!(error = %e, "Secret resolution failed");
            }
        })?;

        verify_signature(&secrets.webhook_secret, request.body(), request.signature())
            .inspect_err(|e| warn!(error = %e, "Webhook signature rejected"))?;

        log_trigger(request);

        self.run_update(&secrets).await.inspect_err(|e| {
            if e.is_transient() {
                warn!(error = %e, "Submodule update could not reach the remote");
            } else {
                error!(error = %e, "Submodule update failed");
            }
        })?;

        Ok(SUCCESS_BODY)
    }

    async fn resolve_secrets(&self) -> Result<ResolvedSecrets, SecretError> {
        tokio::time::timeout(self.timeouts.secret, self.secrets.resolve())
            .await
            .unwrap_or_else(|_| {
                Err(SecretError::unavailable(format!(
                    "secret resolution exceeded {}s",
                    self.timeouts.secret.as_secs()
                )))
            })
    }

    async fn run_update(&self, secrets: &ResolvedSecrets) -> Result<(), UpdateError> {
        let token = secrets.api_token.as_ref();

        tokio::time::timeout(self.timeouts.update, self.updater.update_submodules(token))
            .await
            .unwrap_or_else(|_| {
                Err(UpdateError::connection(format!(
                    "update exceeded {}s",
                    self.timeouts.update.as_secs()
                )))
            })
    }
}

/// Logs which repository triggered the update, if the payload says.
fn log_trigger(request: &WebhookRequest) {
    match request.repository_name() {
        Ok(repository) => info!(repository = %repository, "Updating submodules"),
        Err(e) => warn!(error = %e, "Could not read repository name from payload"),
    }
}

/// Webhook endpoint handler.
///
/// Responds `200 ok` once the update finished. Failures map to status codes
/// through [`ApiError`].
#[instrument(
    name = "handle_update",
    skip(state, headers, body),
    fields(
        event = headers.get("x-github-event").and_then(|v| v.to_str().ok()).unwrap_or("unknown"),
        delivery = headers.get("x-github-delivery").and_then(|v| v.to_str().ok()).unwrap_or("none"),
        content_length = body.len(),
    )
)]
pub async fn handle_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    debug!("Received webhook");

    let request = WebhookRequest::new(headers, body);

    state.update_service.process(&request).await.map_err(|e| {
        debug!(code = e.code(), "Webhook handling failed");
        ApiError::from(e)
    })
}
