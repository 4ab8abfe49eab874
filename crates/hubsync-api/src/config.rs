//! Configuration management for the hubsync webhook service.

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use hubsync_git::{GitUpdaterConfig, DEFAULT_COMMIT_MESSAGE};
use hubsync_secrets::{
    KmsClientConfig, KmsSecretSettings, DEFAULT_KMS_ENDPOINT, DEFAULT_KMS_TIMEOUT_SECONDS,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::handlers::HandlerTimeouts;

const CONFIG_FILE: &str = "config.toml";

/// Which secret provider a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretVariant {
    /// Plain `SECRET_TOKEN`.
    Env,
    /// KMS-encrypted webhook secret and API token.
    Kms,
}

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// Secret-bearing fields (`SECRET_TOKEN`, `KMS_ACCESS_TOKEN`) are never
/// serialized and never shown by `Debug`.
///
/// # Example
///
/// ```no_run
/// use hubsync_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// Global HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Plain secret
    /// Webhook signing secret for unencrypted deployments.
    ///
    /// Environment variable: `SECRET_TOKEN`
    #[serde(default, alias = "SECRET_TOKEN", skip_serializing)]
    pub secret_token: Option<String>,

    // Encrypted secrets
    /// Key resource used to decrypt the ciphertexts. Selects the KMS
    /// provider when set.
    ///
    /// Environment variable: `KMS_CRYPTO_KEY_ID`
    #[serde(default, alias = "KMS_CRYPTO_KEY_ID", skip_serializing_if = "Option::is_none")]
    pub kms_crypto_key_id: Option<String>,
    /// Base64 ciphertext of the webhook signing secret.
    ///
    /// Environment variable: `WEBHOOK_SECRET_CIPHERTEXT`
    #[serde(default, alias = "WEBHOOK_SECRET_CIPHERTEXT", skip_serializing_if = "Option::is_none")]
    pub webhook_secret_ciphertext: Option<String>,
    /// Base64 ciphertext of the API token handed to the updater.
    ///
    /// Environment variable: `API_TOKEN_CIPHERTEXT`
    #[serde(default, alias = "API_TOKEN_CIPHERTEXT", skip_serializing_if = "Option::is_none")]
    pub api_token_ciphertext: Option<String>,
    /// Key-management REST endpoint.
    ///
    /// Environment variable: `KMS_ENDPOINT`
    #[serde(default = "default_kms_endpoint", alias = "KMS_ENDPOINT")]
    pub kms_endpoint: String,
    /// Bearer token presented to the key-management service.
    ///
    /// Environment variable: `KMS_ACCESS_TOKEN`
    #[serde(default, alias = "KMS_ACCESS_TOKEN", skip_serializing)]
    pub kms_access_token: Option<String>,
    /// Deadline for resolving secrets, in seconds.
    ///
    /// Environment variable: `KMS_TIMEOUT_SECONDS`
    #[serde(default = "default_kms_timeout", alias = "KMS_TIMEOUT_SECONDS")]
    pub kms_timeout_seconds: u64,

    // Update
    /// Working copy whose submodules are updated.
    ///
    /// Environment variable: `REPOSITORY_PATH`
    #[serde(default = "default_repository_path", alias = "REPOSITORY_PATH")]
    pub repository_path: PathBuf,
    /// `git` executable.
    ///
    /// Environment variable: `GIT_BINARY`
    #[serde(default = "default_git_binary", alias = "GIT_BINARY")]
    pub git_binary: PathBuf,
    /// Commit and push updated submodule pointers.
    ///
    /// Environment variable: `GIT_PUSH_CHANGES`
    #[serde(default, alias = "GIT_PUSH_CHANGES")]
    pub git_push_changes: bool,
    /// Commit message for pushed updates.
    ///
    /// Environment variable: `GIT_COMMIT_MESSAGE`
    #[serde(default = "default_commit_message", alias = "GIT_COMMIT_MESSAGE")]
    pub git_commit_message: String,
    /// Deadline for the update collaborator, in seconds.
    ///
    /// Environment variable: `UPDATE_TIMEOUT_SECONDS`
    #[serde(default = "default_update_timeout", alias = "UPDATE_TIMEOUT_SECONDS")]
    pub update_timeout_seconds: u64,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result fails
    /// validation.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Secret provider selected by this configuration.
    pub fn secret_variant(&self) -> SecretVariant {
        if non_empty(self.kms_crypto_key_id.as_deref()).is_some() {
            SecretVariant::Kms
        } else {
            SecretVariant::Env
        }
    }

    /// Signing secret for the plain provider.
    pub fn secret_token(&self) -> Option<SecretString> {
        non_empty(self.secret_token.as_deref()).map(SecretString::from)
    }

    /// Convert to the key-management client configuration.
    pub fn kms_client_config(&self) -> KmsClientConfig {
        KmsClientConfig {
            endpoint: self.kms_endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.kms_timeout_seconds),
            access_token: non_empty(self.kms_access_token.as_deref()).map(SecretString::from),
            ..KmsClientConfig::default()
        }
    }

    /// Convert to the encrypted secret settings.
    pub fn kms_secret_settings(&self) -> KmsSecretSettings {
        KmsSecretSettings {
            crypto_key_id: non_empty(self.kms_crypto_key_id.as_deref()).map(str::to_string),
            webhook_secret_ciphertext: non_empty(self.webhook_secret_ciphertext.as_deref())
                .map(str::to_string),
            api_token_ciphertext: non_empty(self.api_token_ciphertext.as_deref())
                .map(str::to_string),
        }
    }

    /// Convert to the git updater configuration.
    pub fn git_updater_config(&self) -> GitUpdaterConfig {
        GitUpdaterConfig {
            repository_path: self.repository_path.clone(),
            git_binary: self.git_binary.clone(),
            push_changes: self.git_push_changes,
            commit_message: self.git_commit_message.clone(),
        }
    }

    /// Per-request deadlines for the handler.
    pub fn handler_timeouts(&self) -> HandlerTimeouts {
        HandlerTimeouts {
            secret: Duration::from_secs(self.kms_timeout_seconds),
            update: Duration::from_secs(self.update_timeout_seconds),
        }
    }

    /// Global request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    ///
    /// Missing secrets are not an error here: the service starts and
    /// answers webhooks with a server error until they are configured.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.kms_timeout_seconds == 0 {
            anyhow::bail!("kms_timeout_seconds must be greater than 0");
        }

        if self.update_timeout_seconds == 0 {
            anyhow::bail!("update_timeout_seconds must be greater than 0");
        }

        // The handler deadlines must expire before the router-wide timeout answers 408.
        let handler_budget = self.kms_timeout_seconds.saturating_add(self.update_timeout_seconds);
        if self.request_timeout <= handler_budget {
            anyhow::bail!(
                "request_timeout ({}s) must exceed kms_timeout_seconds + update_timeout_seconds ({}s)",
                self.request_timeout,
                handler_budget
            );
        }

        if self.secret_variant() == SecretVariant::Kms && self.kms_endpoint.trim().is_empty() {
            anyhow::bail!("kms_endpoint must be set when kms_crypto_key_id is configured");
        }

        if self.git_commit_message.trim().is_empty() {
            anyhow::bail!("git_commit_message cannot be empty");
        }

        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");

        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("secret_token", &redacted(&self.secret_token))
            .field("kms_crypto_key_id", &self.kms_crypto_key_id)
            .field("webhook_secret_ciphertext", &self.webhook_secret_ciphertext)
            .field("api_token_ciphertext", &self.api_token_ciphertext)
            .field("kms_endpoint", &self.kms_endpoint)
            .field("kms_access_token", &redacted(&self.kms_access_token))
            .field("kms_timeout_seconds", &self.kms_timeout_seconds)
            .field("repository_path", &self.repository_path)
            .field("git_binary", &self.git_binary)
            .field("git_push_changes", &self.git_push_changes)
            .field("git_commit_message", &self.git_commit_message)
            .field("update_timeout_seconds", &self.update_timeout_seconds)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            secret_token: None,
            kms_crypto_key_id: None,
            webhook_secret_ciphertext: None,
            api_token_ciphertext: None,
            kms_endpoint: default_kms_endpoint(),
            kms_access_token: None,
            kms_timeout_seconds: default_kms_timeout(),
            repository_path: default_repository_path(),
            git_binary: default_git_binary(),
            git_push_changes: false,
            git_commit_message: default_commit_message(),
            update_timeout_seconds: default_update_timeout(),
            rust_log: default_log_level(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    60
}

fn default_kms_endpoint() -> String {
    DEFAULT_KMS_ENDPOINT.to_string()
}

fn default_kms_timeout() -> u64 {
    DEFAULT_KMS_TIMEOUT_SECONDS
}

fn default_repository_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_git_binary() -> PathBuf {
    PathBuf::from("git")
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

fn default_update_timeout() -> u64 {
    45
}

fn default_log_level() -> String {
    "info".to_string()
}
