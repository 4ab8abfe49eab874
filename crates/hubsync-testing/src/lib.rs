//! Test infrastructure for hubsync.
//!
//! Provides scripted collaborators, a wiremock key-management service,
//! signed webhook builders, an in-process router harness and proptest
//! strategies shared by the crates' integration tests.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod doubles;
pub mod fixtures;
pub mod kms;
pub mod strategies;

pub use app::{TestApp, TestResponse};
pub use doubles::{MockUpdater, StaticSecretProvider, UpdateOutcome};
pub use fixtures::{push_payload, sign_body, WebhookBuilder};
pub use kms::{MockKms, TEST_CRYPTO_KEY_ID};
