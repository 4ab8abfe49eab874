//! Error taxonomy for webhook authentication and update handling.
//!
//! Each stage of request handling owns one error enum: signature
//! verification (`AuthError`), secret resolution (`SecretError`) and the
//! update collaborator (`UpdateError`). `HookError` carries any of them back
//! to the HTTP entry point, which is the only place they become status
//! codes. Codes returned by `HookError::code` are stable and appear in logs
//! for correlation; they are never sent to clients.

use std::fmt;

use thiserror::Error;

/// Result type alias using `HookError`.
pub type Result<T> = std::result::Result<T, HookError>;

/// Signature verification failures. All are attributable to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The signature header was absent or empty.
    #[error("signature header missing")]
    MissingSignature,

    /// The header named an algorithm other than the supported one.
    #[error("unsupported signature algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// Algorithm identifier as sent by the caller
        algorithm: String,
    },

    /// The digest did not match the keyed hash of the body.
    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Kind of failure reported by the key-management service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalFailure {
    /// Service unreachable, timed out, or reported a transient server error.
    Unavailable,
    /// Service refused the request (permissions, unknown key, bad input).
    Rejected,
    /// Service answered but the response could not be decoded.
    Malformed,
}

impl fmt::Display for ExternalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::Rejected => write!(f, "rejected"),
            Self::Malformed => write!(f, "malformed"),
        }
    }
}

/// Secret resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    /// Required configuration is missing or empty.
    #[error("secret configuration error: {message}")]
    Config {
        /// Which setting is missing
        message: String,
    },

    /// The key-management service call failed.
    #[error("key management service {kind}: {message}")]
    ExternalService {
        /// Failure category
        kind: ExternalFailure,
        /// Diagnostic detail, never containing plaintext
        message: String,
    },
}

impl SecretError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Creates an error for an unreachable or overloaded service.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ExternalService { kind: ExternalFailure::Unavailable, message: message.into() }
    }

    /// Creates an error for a request the service refused.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::ExternalService { kind: ExternalFailure::Rejected, message: message.into() }
    }

    /// Creates an error for an undecodable service response.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::ExternalService { kind: ExternalFailure::Malformed, message: message.into() }
    }

    /// Returns `true` when the failure is expected to clear on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ExternalService { kind: ExternalFailure::Unavailable, .. })
    }
}

/// Failures reported by the submodule update collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// A remote could not be reached.
    #[error("connection failed: {message}")]
    Connection {
        /// Diagnostic detail
        message: String,
    },

    /// Access to the repository or a remote was denied.
    #[error("permission denied: {message}")]
    Permission {
        /// Diagnostic detail
        message: String,
    },

    /// Any other failure, including violated repository invariants.
    #[error("update failed: {message}")]
    Runtime {
        /// Diagnostic detail
        message: String,
    },
}

impl UpdateError {
    /// Creates a connectivity error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into() }
    }

    /// Creates a permission error.
    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission { message: message.into() }
    }

    /// Creates a runtime error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime { message: message.into() }
    }

    /// Returns `true` when the sender should retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Best-effort payload inspection failures. Never fail a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The body is not JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    /// The body is JSON without `repository.name`.
    #[error("payload has no repository name")]
    MissingRepositoryName,
}

/// Any failure that aborts handling of a webhook request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// Signature verification failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Secrets could not be resolved.
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// The update collaborator failed.
    #[error(transparent)]
    Update(#[from] UpdateError),
}

impl HookError {
    /// Returns the log correlation code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(AuthError::MissingSignature) => "E1001",
            Self::Auth(AuthError::UnsupportedAlgorithm { .. }) => "E1002",
            Self::Auth(AuthError::SignatureMismatch) => "E1003",
            Self::Secret(SecretError::Config { .. }) => "E2001",
            Self::Secret(SecretError::ExternalService { .. }) => "E2002",
            Self::Update(UpdateError::Connection { .. }) => "E3001",
            Self::Update(UpdateError::Permission { .. }) => "E3002",
            Self::Update(UpdateError::Runtime { .. }) => "E3003",
        }
    }

    /// Returns `true` if the caller is responsible for the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_identified_correctly() {
        assert!(SecretError::unavailable("connection refused").is_transient());
        assert!(!SecretError::malformed("bad base64").is_transient());
        assert!(!SecretError::rejected("403").is_transient());
        assert!(!SecretError::config("SECRET_TOKEN").is_transient());

        assert!(UpdateError::connection("could not resolve host").is_transient());
        assert!(!UpdateError::permission("denied").is_transient());
        assert!(!UpdateError::runtime("dirty tree").is_transient());
    }

    #[test]
    fn codes_are_unique() {
        let errors: Vec<HookError> = vec![
            AuthError::MissingSignature.into(),
            AuthError::UnsupportedAlgorithm { algorithm: "md5".into() }.into(),
            AuthError::SignatureMismatch.into(),
            SecretError::config("x").into(),
            SecretError::unavailable("x").into(),
            UpdateError::connection("x").into(),
            UpdateError::permission("x").into(),
            UpdateError::runtime("x").into(),
        ];

        let mut codes: Vec<_> = errors.iter().map(HookError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn error_display_format() {
        let error = AuthError::UnsupportedAlgorithm { algorithm: "sha256".into() };
        assert_eq!(error.to_string(), "unsupported signature algorithm: sha256");

        let error = SecretError::malformed("plaintext is not base64");
        assert_eq!(error.to_string(), "key management service malformed: plaintext is not base64");

        let hook: HookError = UpdateError::connection("timed out").into();
        assert_eq!(hook.to_string(), "connection failed: timed out");
    }

    #[test]
    fn only_auth_errors_are_client_errors() {
        assert!(HookError::from(AuthError::SignatureMismatch).is_client_error());
        assert!(!HookError::from(SecretError::config("x")).is_client_error());
        assert!(!HookError::from(UpdateError::runtime("x")).is_client_error());
    }
}
