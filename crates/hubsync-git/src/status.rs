//! Parsing of `git status --porcelain=v2 --branch` output.

/// Local state that decides whether an update needs publishing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WorkingTreeStatus {
    /// Tracked files differ from `HEAD`. Untracked and ignored files do not count.
    pub dirty: bool,
    /// Commits on the branch that its upstream lacks; `None` without an upstream.
    pub ahead: Option<u64>,
}

impl WorkingTreeStatus {
    pub(crate) fn parse(output: &str) -> Self {
        let mut status = Self::default();

        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            if let Some(header) = line.strip_prefix("# ") {
                if let Some(counts) = header.strip_prefix("branch.ab ") {
                    status.ahead = counts
                        .split_whitespace()
                        .next()
                        .and_then(|ahead| ahead.strip_prefix('+'))
                        .and_then(|ahead| ahead.parse().ok());
                }
            } else if !line.starts_with('?') && !line.starts_with('!') {
                status.dirty = true;
            }
        }

        status
    }

    pub(crate) fn has_unpushed_commits(&self) -> bool {
        self.ahead.is_some_and(|ahead| ahead > 0)
    }
}
