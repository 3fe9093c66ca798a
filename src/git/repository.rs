use crate::errors::{PatchStackError, Result};
use crate::git::vcs::{CommitSummary, RebaseOutcome, VersionControl};
use chrono::DateTime;
use git2::{BranchType, ErrorCode, Oid, Repository, Signature};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Repository information
#[derive(Debug, Clone)]
pub struct RepositoryInfo {
    pub path: PathBuf,
    pub head_branch: Option<String>,
    pub head_commit: Option<String>,
    pub is_dirty: bool,
}

/// Wrapper around git2::Repository with safe operations
pub struct GitRepository {
    repo: Repository,
    path: PathBuf,
}

impl GitRepository {
    /// Open a Git repository at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(|e| PatchStackError::config(format!("Not a git repository: {e}")))?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| PatchStackError::config("Repository has no working directory"))?
            .to_path_buf();

        Ok(Self {
            repo,
            path: workdir,
        })
    }

    /// Get repository information
    pub fn get_info(&self) -> Result<RepositoryInfo> {
        Ok(RepositoryInfo {
            path: self.path.clone(),
            head_branch: self.current_branch()?,
            head_commit: self.get_head_commit_hash().ok(),
            is_dirty: self.is_dirty()?,
        })
    }

    /// Get repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the HEAD commit hash
    pub fn get_head_commit_hash(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// Check if the working directory has uncommitted changes to tracked files
    pub fn is_dirty(&self) -> Result<bool> {
        let statuses = self.repo.statuses(None)?;

        Ok(statuses.iter().any(|status| {
            status.status().intersects(
                git2::Status::INDEX_MODIFIED
                    | git2::Status::INDEX_NEW
                    | git2::Status::INDEX_DELETED
                    | git2::Status::WT_MODIFIED
                    | git2::Status::WT_DELETED,
            )
        }))
    }

    /// Check if a rebase is stopped in this repository
    pub fn is_rebase_in_progress(&self) -> bool {
        matches!(
            self.repo.state(),
            git2::RepositoryState::Rebase
                | git2::RepositoryState::RebaseInteractive
                | git2::RepositoryState::RebaseMerge
        )
    }

    /// Get list of conflicted files
    pub fn get_conflicted_files(&self) -> Result<Vec<String>> {
        let index = self.repo.index()?;

        let mut conflicts = Vec::new();
        for conflict in index.conflicts()? {
            let conflict = conflict?;
            let entry = conflict.our.or(conflict.their).or(conflict.ancestor);
            if let Some(entry) = entry {
                if let Ok(path) = std::str::from_utf8(&entry.path) {
                    if !conflicts.iter().any(|p| p == path) {
                        conflicts.push(path.to_string());
                    }
                }
            }
        }

        Ok(conflicts)
    }

    fn parse_oid(&self, id: &str) -> Result<Oid> {
        Oid::from_str(id)
            .map_err(|e| PatchStackError::collaborator(format!("Invalid commit id '{id}': {e}")))
    }

    /// Reload the index from disk. The handle keeps its own copy, which goes
    /// stale when another process commits.
    fn refresh_index(&self) -> Result<()> {
        self.repo.index()?.read(true)?;
        Ok(())
    }

    /// Get a signature for commits
    fn get_signature(&self) -> Result<Signature<'static>> {
        // Try to get signature from Git config
        if let Ok(config) = self.repo.config() {
            if let (Ok(name), Ok(email)) = (
                config.get_string("user.name"),
                config.get_string("user.email"),
            ) {
                return Ok(Signature::now(&name, &email)?);
            }
        }

        // Fallback to default signature
        Ok(Signature::now("patchstack", "patchstack@localhost")?)
    }
}

impl VersionControl for GitRepository {
    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(str::to_string))
        } else {
            Ok(None)
        }
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) if e.code() == ErrorCode::InvalidSpec => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_branch(&self, name: &str, from_tip: &str) -> Result<()> {
        let commit = self.repo.find_commit(self.parse_oid(from_tip)?)?;

        self.repo.branch(name, &commit, false).map_err(|e| {
            PatchStackError::collaborator(format!("Could not create branch '{name}': {e}"))
        })?;

        info!("Created branch '{}' at {}", name, &from_tip[..from_tip.len().min(8)]);
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        let branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|_| PatchStackError::BranchNotFound(name.to_string()))?;

        let tree = branch.get().peel_to_tree()?;
        self.refresh_index()?;

        // Checkout the tree
        self.repo.checkout_tree(tree.as_object(), None).map_err(|e| {
            PatchStackError::collaborator(format!("Could not checkout branch '{name}': {e}"))
        })?;

        // Update HEAD
        self.repo.set_head(&format!("refs/heads/{name}"))?;

        info!("Switched to branch '{}'", name);
        Ok(())
    }

    fn tip(&self, name: &str) -> Result<String> {
        let branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|_| PatchStackError::BranchNotFound(name.to_string()))?;

        let commit = branch.get().peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>> {
        match self.repo.merge_base(self.parse_oid(a)?, self.parse_oid(b)?) {
            Ok(oid) => Ok(Some(oid.to_string())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn is_descendant(&self, commit: &str, ancestor: &str) -> Result<bool> {
        let commit = self.parse_oid(commit)?;
        let ancestor = self.parse_oid(ancestor)?;
        if commit == ancestor {
            return Ok(true);
        }
        Ok(self.repo.graph_descendant_of(commit, ancestor)?)
    }

    fn rebase(&self, branch: &str, upstream: &str, onto: &str) -> Result<RebaseOutcome> {
        let branch_ref = self
            .repo
            .find_reference(&format!("refs/heads/{branch}"))
            .map_err(|_| PatchStackError::BranchNotFound(branch.to_string()))?;
        let branch_commit = self.repo.reference_to_annotated_commit(&branch_ref)?;
        let upstream_commit = self.repo.find_annotated_commit(self.parse_oid(upstream)?)?;
        let onto_commit = self.repo.find_annotated_commit(self.parse_oid(onto)?)?;

        let signature = self.get_signature()?;
        self.refresh_index()?;
        let mut rebase = self.repo.rebase(
            Some(&branch_commit),
            Some(&upstream_commit),
            Some(&onto_commit),
            None,
        )?;

        debug!(
            "Rebasing '{}': {} operation(s) onto {}",
            branch,
            rebase.len(),
            onto
        );

        while let Some(operation) = rebase.next() {
            let operation = operation?;

            if self.repo.index()?.has_conflicts() {
                let paths = self.get_conflicted_files()?;
                debug!(
                    "Commit {} of '{}' conflicts in {:?}",
                    operation.id(),
                    branch,
                    paths
                );
                return Ok(RebaseOutcome::Conflict { paths });
            }

            match rebase.commit(None, &signature, None) {
                Ok(_) => {}
                // The change is already on the new base
                Err(e) if e.code() == ErrorCode::Applied => {
                    debug!("Skipping already applied commit {}", operation.id());
                }
                Err(e) => return Err(e.into()),
            }
        }

        rebase.finish(Some(&signature))?;

        let new_tip = self.tip(branch)?;
        info!("Rebased '{}' onto {}", branch, &onto[..onto.len().min(8)]);
        Ok(RebaseOutcome::Completed { new_tip })
    }

    fn abort_rebase(&self) -> Result<()> {
        let mut rebase = self.repo.open_rebase(None).map_err(|e| {
            PatchStackError::collaborator(format!("No rebase in progress to abort: {e}"))
        })?;
        rebase.abort()?;

        debug!("Rebase aborted successfully");
        Ok(())
    }

    fn diff(&self, base: &str, end: &str) -> Result<String> {
        let base_tree = self.repo.find_commit(self.parse_oid(base)?)?.tree()?;
        let end_tree = self.repo.find_commit(self.parse_oid(end)?)?.tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&end_tree), None)?;

        let mut text = String::new();
        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(text)
    }

    fn log(&self, base: &str, end: &str) -> Result<Vec<CommitSummary>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
        revwalk.push(self.parse_oid(end)?)?;
        revwalk.hide(self.parse_oid(base)?)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(CommitSummary {
                id: commit.id().to_string(),
                summary: commit.summary().unwrap_or("").to_string(),
                author: commit.author().name().unwrap_or("").to_string(),
                time: DateTime::from_timestamp(commit.time().seconds(), 0),
            });
        }

        Ok(commits)
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|_| PatchStackError::BranchNotFound(name.to_string()))?;

        branch.delete().map_err(|e| {
            PatchStackError::collaborator(format!("Could not delete branch '{name}': {e}"))
        })?;

        info!("Deleted branch '{}'", name);
        Ok(())
    }
}
