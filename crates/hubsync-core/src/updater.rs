//! Trait seam for the external submodule update collaborator.

use async_trait::async_trait;

use crate::{error::UpdateError, secret::Secret};

/// Updates the nested submodules of the managed repository.
///
/// Implementations own all repository mechanics (fetching, checkout,
/// credentials). The core only relies on the three-way failure taxonomy of
/// [`UpdateError`]: connectivity, permission, and everything else.
#[async_trait]
pub trait SubmoduleUpdater: Send + Sync {
    /// Runs one update.
    ///
    /// `token` is the API token resolved for this request, present only
    /// when secrets come from the key-management service.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::Connection` when a remote is unreachable,
    /// `UpdateError::Permission` when access is denied, and
    /// `UpdateError::Runtime` for any other failure.
    async fn update_submodules(&self, token: Option<&Secret>) -> Result<(), UpdateError>;
}
