//! In-memory collaborators with scripted outcomes.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use hubsync_core::{ResolvedSecrets, Secret, SecretError, SubmoduleUpdater, UpdateError};
use hubsync_secrets::SecretProvider;

/// What a [`MockUpdater`] does when called.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// Return `Ok(())`.
    Succeed,
    /// Return the given error.
    Fail(UpdateError),
    /// Never complete.
    Hang,
}

/// Update collaborator that records its calls.
#[derive(Debug)]
pub struct MockUpdater {
    outcome: UpdateOutcome,
    calls: AtomicUsize,
    tokens: Mutex<Vec<Option<String>>>,
}

impl MockUpdater {
    /// Creates an updater with the given outcome.
    pub fn new(outcome: UpdateOutcome) -> Self {
        Self { outcome, calls: AtomicUsize::new(0), tokens: Mutex::new(Vec::new()) }
    }

    /// Updater that always succeeds.
    pub fn succeeding() -> Self {
        Self::new(UpdateOutcome::Succeed)
    }

    /// Updater that always fails with `error`.
    pub fn failing(error: UpdateError) -> Self {
        Self::new(UpdateOutcome::Fail(error))
    }

    /// Updater that never returns.
    pub fn hanging() -> Self {
        Self::new(UpdateOutcome::Hang)
    }

    /// Number of times the updater was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tokens received, in call order.
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

#[async_trait]
impl SubmoduleUpdater for MockUpdater {
    async fn update_submodules(&self, token: Option<&Secret>) -> Result<(), UpdateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(token.map(|t| String::from_utf8_lossy(t.expose()).into_owned()));

        match &self.outcome {
            UpdateOutcome::Succeed => Ok(()),
            UpdateOutcome::Fail(error) => Err(error.clone()),
            UpdateOutcome::Hang => std::future::pending().await,
        }
    }
}

/// Secret provider returning fixed values.
#[derive(Debug)]
pub struct StaticSecretProvider {
    result: Result<(String, Option<String>), SecretError>,
    resolves: AtomicUsize,
}

impl StaticSecretProvider {
    /// Provider for a plain signing secret.
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self::from_result(Ok((webhook_secret.into(), None)))
    }

    /// Provider for a signing secret plus API token, as the KMS variant
    /// yields.
    pub fn with_token(webhook_secret: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self::from_result(Ok((webhook_secret.into(), Some(api_token.into()))))
    }

    /// Provider whose every resolve fails with `error`.
    pub fn failing(error: SecretError) -> Self {
        Self::from_result(Err(error))
    }

    fn from_result(result: Result<(String, Option<String>), SecretError>) -> Self {
        Self { result, resolves: AtomicUsize::new(0) }
    }

    /// Number of resolves performed.
    pub fn resolve_count(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn resolve(&self) -> Result<ResolvedSecrets, SecretError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);

        match &self.result {
            Ok((secret, None)) => Ok(ResolvedSecrets::signing_only(Secret::from(secret.as_str()))),
            Ok((secret, Some(token))) => Ok(ResolvedSecrets::with_api_token(
                Secret::from(secret.as_str()),
                Secret::from(token.as_str()),
            )),
            Err(error) => Err(error.clone()),
        }
    }

    fn variant(&self) -> &'static str {
        "static"
    }
}
