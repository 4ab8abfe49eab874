//! HTTP request handlers.
//!
//! - `update` authenticates a webhook and triggers the submodule update.
//! - `health` answers liveness probes.
//!
//! Handlers never put error details in responses; the body is the status
//! reason phrase and the diagnostics go to the logs.

pub mod health;
pub mod update;

pub use health::health_check;
pub use update::{handle_update, HandlerTimeouts, UpdateService, SUCCESS_BODY};
