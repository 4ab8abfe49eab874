//! In-process router harness driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{body::Body, Router};
use http::{HeaderMap, Request, StatusCode};
use hubsync_api::{create_router, AppState, HandlerTimeouts};
use hubsync_secrets::SecretProvider;
use tower::ServiceExt;

use crate::{MockUpdater, StaticSecretProvider};

/// Collected response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
}

/// Router wired to test collaborators.
pub struct TestApp {
    router: Router,
    /// Update collaborator, for asserting calls.
    pub updater: Arc<MockUpdater>,
}

impl TestApp {
    /// Router over the given provider and updater with default deadlines.
    pub fn new(secrets: Arc<dyn SecretProvider>, updater: Arc<MockUpdater>) -> Self {
        Self::with_timeouts(secrets, updater, HandlerTimeouts::default())
    }

    /// Router with explicit per-request deadlines.
    pub fn with_timeouts(
        secrets: Arc<dyn SecretProvider>,
        updater: Arc<MockUpdater>,
        timeouts: HandlerTimeouts,
    ) -> Self {
        let state = AppState::new(secrets, updater.clone(), timeouts);
        Self { router: create_router(state), updater }
    }

    /// Router with a plain signing secret and a succeeding updater.
    pub fn with_secret(secret: &str) -> Self {
        Self::new(Arc::new(StaticSecretProvider::new(secret)), Arc::new(MockUpdater::succeeding()))
    }

    /// Sends one request and collects the response.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response =
            self.router.clone().oneshot(request).await.expect("Failed to make request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        TestResponse { status, headers, body: String::from_utf8_lossy(&bytes).into_owned() }
    }
}
