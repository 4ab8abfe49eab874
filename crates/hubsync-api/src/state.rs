//! Shared application state and collaborator wiring.

use std::sync::Arc;

use anyhow::{Context, Result};
use hubsync_core::SubmoduleUpdater;
use hubsync_git::GitSubmoduleUpdater;
use hubsync_secrets::{EnvSecretProvider, HttpKmsClient, KmsSecretProvider, SecretProvider};
use tracing::{info, warn};

use crate::{
    config::{Config, SecretVariant},
    handlers::{HandlerTimeouts, UpdateService},
};

/// State shared by all handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Webhook orchestration.
    pub update_service: UpdateService,
}

impl AppState {
    /// Creates state from explicit collaborators.
    pub fn new(
        secrets: Arc<dyn SecretProvider>,
        updater: Arc<dyn SubmoduleUpdater>,
        timeouts: HandlerTimeouts,
    ) -> Self {
        Self { update_service: UpdateService::new(secrets, updater, timeouts) }
    }

    /// Builds production collaborators from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key-management HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let secrets = build_secret_provider(config)?;
        let updater = Arc::new(GitSubmoduleUpdater::new(config.git_updater_config()));

        Ok(Self::new(secrets, updater, config.handler_timeouts()))
    }
}

/// Selects the secret provider: KMS when a crypto key id is configured,
/// the plain `SECRET_TOKEN` otherwise.
///
/// # Errors
///
/// Returns an error if the key-management HTTP client cannot be built.
pub fn build_secret_provider(config: &Config) -> Result<Arc<dyn SecretProvider>> {
    match config.secret_variant() {
        SecretVariant::Kms => {
            if config.secret_token().is_some() {
                warn!("SECRET_TOKEN is ignored because KMS_CRYPTO_KEY_ID is configured");
            }

            let client = HttpKmsClient::new(config.kms_client_config())
                .context("Failed to build key management client")?;

            info!(endpoint = %config.kms_endpoint, "Using KMS-encrypted webhook secret");
            Ok(Arc::new(KmsSecretProvider::new(Arc::new(client), config.kms_secret_settings())))
        },
        SecretVariant::Env => {
            let secret_token = config.secret_token();
            if secret_token.is_none() {
                warn!("SECRET_TOKEN is not set; webhooks will be answered with 500");
            }

            info!("Using plain webhook secret");
            Ok(Arc::new(EnvSecretProvider::new(secret_token)))
        },
    }
}
