use crate::errors::Result;
use chrono::{DateTime, Utc};

/// Result of replaying a branch onto a new base
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseOutcome {
    /// Every commit applied; the branch now points at `new_tip`
    Completed { new_tip: String },
    /// The rebase stopped on conflicts and is still in progress.
    /// The caller must call [`VersionControl::abort_rebase`].
    Conflict { paths: Vec<String> },
}

/// One line of `log` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: String,
    pub summary: String,
    pub author: String,
    pub time: Option<DateTime<Utc>>,
}

impl CommitSummary {
    /// Get a short version of the commit hash
    pub fn short_id(&self) -> &str {
        if self.id.len() >= 8 {
            &self.id[..8]
        } else {
            &self.id
        }
    }
}

/// The version-control operations the stack engine relies on.
///
/// Tips are full commit ids in hex. Every call is blocking and observes the
/// live repository; implementations must not cache between calls.
pub trait VersionControl {
    /// Name of the checked-out branch, `None` for a detached or unborn HEAD
    fn current_branch(&self) -> Result<Option<String>>;

    fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Create `name` pointing at `from_tip` without checking it out
    fn create_branch(&self, name: &str, from_tip: &str) -> Result<()>;

    fn checkout(&self, name: &str) -> Result<()>;

    /// Commit id the branch points at
    fn tip(&self, name: &str) -> Result<String>;

    /// Best common ancestor, `None` for unrelated histories
    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>>;

    /// True when `ancestor` is reachable from `commit` (or equal to it)
    fn is_descendant(&self, commit: &str, ancestor: &str) -> Result<bool>;

    /// Replay the commits of `branch` that are not reachable from `upstream`
    /// onto `onto`, moving the branch on success.
    fn rebase(&self, branch: &str, upstream: &str, onto: &str) -> Result<RebaseOutcome>;

    /// Abandon an in-progress rebase, restoring the branch to its old tip
    fn abort_rebase(&self) -> Result<()>;

    /// Patch text of the changes from `base` to `end`
    fn diff(&self, base: &str, end: &str) -> Result<String>;

    /// Commits reachable from `end` but not from `base`, newest first
    fn log(&self, base: &str, end: &str) -> Result<Vec<CommitSummary>>;

    fn delete_branch(&self, name: &str) -> Result<()>;
}
