//! Submodule update collaborator backed by the `git` command line.
//!
//! Runs `git submodule update --init --recursive --remote` inside the
//! managed working copy and, when enabled, commits and pushes the updated
//! submodule pointers. Failures are classified into the connectivity,
//! permission and runtime categories the HTTP entry point maps to status
//! codes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod status;
mod updater;

use std::path::PathBuf;

pub use classify::classify_stderr;
pub use updater::GitSubmoduleUpdater;

/// Default commit message for pushed submodule updates.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update submodules";

/// Configuration for [`GitSubmoduleUpdater`].
#[derive(Debug, Clone)]
pub struct GitUpdaterConfig {
    /// Working copy whose submodules are updated.
    pub repository_path: PathBuf,
    /// `git` executable to invoke.
    pub git_binary: PathBuf,
    /// Commit and push the updated submodule pointers.
    pub push_changes: bool,
    /// Message used for the update commit.
    pub commit_message: String,
}

impl Default for GitUpdaterConfig {
    fn default() -> Self {
        Self {
            repository_path: PathBuf::from("."),
            git_binary: PathBuf::from("git"),
            push_changes: false,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}
