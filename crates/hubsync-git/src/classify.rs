//! Failure classification for git invocations.

use std::io;

use hubsync_core::UpdateError;

const MAX_DETAIL_LEN: usize = 512;

const PERMISSION_MARKERS: &[&str] = &[
    "permission denied",
    "authentication failed",
    "access denied",
    "could not read username",
    "could not read password",
    "repository not found",
    "the requested url returned error: 401",
    "the requested url returned error: 403",
];

const CONNECTION_MARKERS: &[&str] = &[
    "could not resolve host",
    "could not resolve hostname",
    "failed to connect",
    "connection refused",
    "connection timed out",
    "operation timed out",
    "network is unreachable",
    "connection reset",
    "the remote end hung up unexpectedly",
    "the requested url returned error: 502",
    "the requested url returned error: 503",
    "the requested url returned error: 504",
];

/// Classifies a failed git invocation by its stderr output.
///
/// Permission markers win over connection markers because ssh prints both
/// "Permission denied" and "Could not read from remote repository" for a
/// rejected key.
pub fn classify_stderr(operation: &str, exit_code: Option<i32>, stderr: &str) -> UpdateError {
    let lowercase = stderr.to_lowercase();
    let detail = format!(
        "git {operation} exited with {}: {}",
        exit_code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")),
        failure_line(stderr)
    );

    if PERMISSION_MARKERS.iter().any(|m| lowercase.contains(m)) {
        UpdateError::permission(detail)
    } else if CONNECTION_MARKERS.iter().any(|m| lowercase.contains(m)) {
        UpdateError::connection(detail)
    } else {
        UpdateError::runtime(detail)
    }
}

/// Classifies a failure to start git at all.
pub(crate) fn classify_spawn_error(error: &io::Error) -> UpdateError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => {
            UpdateError::permission(format!("cannot execute git: {error}"))
        },
        io::ErrorKind::NotFound => {
            UpdateError::runtime(format!("git or repository path not found: {error}"))
        },
        _ => UpdateError::runtime(format!("failed to spawn git: {error}")),
    }
}

/// First `fatal:` or `error:` line, else the last non-empty one.
fn failure_line(stderr: &str) -> String {
    let lines = || stderr.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = lines()
        .find(|l| l.starts_with("fatal:") || l.starts_with("error:"))
        .or_else(|| lines().last())
        .unwrap_or("");
    line.chars().take(MAX_DETAIL_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns_failure_is_connection() {
        let error = classify_stderr(
            "submodule update",
            Some(128),
            "fatal: unable to access 'https://github.com/org/lib.git/': Could not resolve host: github.com\n",
        );
        assert!(matches!(error, UpdateError::Connection { .. }));
    }

    #[test]
    fn ssh_key_rejection_is_permission() {
        let stderr = "git@github.com: Permission denied (publickey).\n\
                      fatal: Could not read from remote repository.\n";
        let error = classify_stderr("push", Some(128), stderr);
        assert!(matches!(error, UpdateError::Permission { .. }));
    }

    #[test]
    fn http_auth_failure_is_permission() {
        let stderr = "remote: Invalid username or password.\n\
                      fatal: Authentication failed for 'https://github.com/org/app.git/'\n";
        assert!(matches!(classify_stderr("push", Some(128), stderr), UpdateError::Permission { .. }));
    }

    #[test]
    fn unknown_failure_is_runtime() {
        let stderr = "fatal: not a git repository (or any of the parent directories): .git\n";
        let error = classify_stderr("submodule update", Some(128), stderr);

        assert!(matches!(error, UpdateError::Runtime { .. }));
        assert!(error.to_string().contains("not a git repository"));
        assert!(error.to_string().contains("status 128"));
    }

    #[test]
    fn detail_keeps_fatal_line_over_trailing_hint() {
        let stderr = "fatal: '/srv/missing.git' does not appear to be a git repository\n\
                      fatal: Could not read from remote repository.\n\
                      \n\
                      Please make sure you have the correct access rights\n\
                      and the repository exists.\n";
        let message = classify_stderr("push", Some(128), stderr).to_string();

        assert!(message.contains("does not appear to be a git repository"), "{message}");
        assert!(!message.contains("and the repository exists"), "{message}");
    }

    #[test]
    fn detail_falls_back_to_last_line() {
        let stderr = "hint: something\nerror-free trailing output\n";
        let message = classify_stderr("commit", Some(1), stderr).to_string();
        assert!(message.ends_with("error-free trailing output"), "{message}");
    }

    #[test]
    fn detail_is_truncated() {
        let stderr = "x".repeat(4096);
        let error = classify_stderr("push", Some(1), &stderr);
        assert!(error.to_string().len() < 700);
    }

    #[test]
    fn spawn_errors_classified() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(classify_spawn_error(&denied), UpdateError::Permission { .. }));

        let missing = io::Error::new(io::ErrorKind::NotFound, "missing");
        assert!(matches!(classify_spawn_error(&missing), UpdateError::Runtime { .. }));
    }
}
