//! Core domain types for authenticated submodule-update webhooks.
//!
//! Provides the request snapshot, secret wrapper, encrypted secret bundles,
//! the error taxonomy shared by every stage of request handling, and the
//! trait seam for the external update collaborator. All other crates depend
//! on these types so that status mapping happens in exactly one place.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod secret;
pub mod updater;

pub use error::{
    AuthError, ExternalFailure, HookError, PayloadError, Result, SecretError, UpdateError,
};
pub use models::{EncryptedSecretBundle, ResolvedSecrets, WebhookRequest};
pub use secret::Secret;
pub use updater::SubmoduleUpdater;
