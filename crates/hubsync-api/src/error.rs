//! HTTP mapping for webhook handling failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hubsync_core::{AuthError, ExternalFailure, HookError, SecretError, UpdateError};

/// A [`HookError`] on its way out of the HTTP layer.
///
/// This is the only place errors become status codes. The response body is
/// the canonical reason phrase for the status; error details stay in the
/// logs.
#[derive(Debug)]
pub struct ApiError(HookError);

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            HookError::Auth(AuthError::MissingSignature | AuthError::SignatureMismatch) => {
                StatusCode::FORBIDDEN
            },
            HookError::Auth(AuthError::UnsupportedAlgorithm { .. }) => StatusCode::NOT_IMPLEMENTED,
            HookError::Secret(SecretError::ExternalService {
                kind: ExternalFailure::Unavailable,
                ..
            }) => StatusCode::SERVICE_UNAVAILABLE,
            HookError::Secret(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HookError::Update(UpdateError::Connection { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            HookError::Update(UpdateError::Permission { .. } | UpdateError::Runtime { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// The wrapped error.
    pub fn inner(&self) -> &HookError {
        &self.0
    }
}

impl From<HookError> for ApiError {
    fn from(error: HookError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, status.canonical_reason().unwrap_or("Error")).into_response()
    }
}
