//! HTTP entry point for authenticated submodule update webhooks.
//!
//! Receives GitHub-style webhooks, verifies the `X-Hub-Signature` HMAC
//! against a secret resolved per request, and runs the submodule update
//! collaborator. Failures map to `403`, `501`, `503` or `500` in
//! [`error::ApiError`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::{Config, SecretVariant};
pub use error::ApiError;
pub use handlers::{HandlerTimeouts, UpdateService};
pub use server::{create_router, create_router_with_timeout, start_server};
pub use state::{build_secret_provider, AppState};
