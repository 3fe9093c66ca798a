//! Shared fixtures: an in-memory repository and a recording review tool
#![allow(dead_code)]

use patchstack::git::{CommitSummary, RebaseOutcome, VersionControl};
use patchstack::review::ReviewService;
use patchstack::stack::StackStore;
use patchstack::{PatchStackError, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tempfile::TempDir;

type Files = BTreeMap<String, String>;

#[derive(Debug, Clone)]
struct Commit {
    parent: Option<String>,
    files: Files,
    message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Branch(String),
    Detached(String),
}

#[derive(Debug, Clone)]
struct InProgressRebase {
    branch: String,
}

#[derive(Debug, Default)]
struct State {
    commits: HashMap<String, Commit>,
    branches: BTreeMap<String, String>,
    head: Option<Head>,
    rebase: Option<InProgressRebase>,
    next_id: u64,
    calls: Vec<String>,
    failures: HashSet<String>,
}

impl State {
    fn new_commit(&mut self, parent: Option<String>, files: Files, message: &str) -> String {
        self.next_id += 1;
        let id = format!("{:040x}", self.next_id);
        self.commits.insert(
            id.clone(),
            Commit {
                parent,
                files,
                message: message.to_string(),
            },
        );
        id
    }

    fn commit(&self, id: &str) -> Result<&Commit> {
        self.commits
            .get(id)
            .ok_or_else(|| PatchStackError::collaborator(format!("Unknown commit {id}")))
    }

    fn tip(&self, branch: &str) -> Result<String> {
        self.branches
            .get(branch)
            .cloned()
            .ok_or_else(|| PatchStackError::BranchNotFound(branch.to_string()))
    }

    /// `id` and everything before it, nearest first
    fn history(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = Some(id.to_string());
        while let Some(id) = current {
            current = self.commits.get(&id).and_then(|c| c.parent.clone());
            chain.push(id);
        }
        chain
    }
}

/// In-memory stand-in for a git repository.
///
/// Commits carry whole-file snapshots and rebases do a per-file three-way
/// merge, so conflicts arise exactly where both sides changed a file.
pub struct FakeVcs {
    state: RefCell<State>,
}

impl FakeVcs {
    /// Repository with one commit on `root`, which is checked out
    pub fn new(root: &str) -> Self {
        let mut state = State::default();
        let mut files = Files::new();
        files.insert("README.md".to_string(), "# Test\n".to_string());
        let initial = state.new_commit(None, files, "Initial commit");
        state.branches.insert(root.to_string(), initial);
        state.head = Some(Head::Branch(root.to_string()));
        Self {
            state: RefCell::new(state),
        }
    }

    /// Commit a file change on the checked-out branch
    pub fn commit(&self, file: &str, content: &str, message: &str) -> String {
        let branch = match self.head() {
            Some(Head::Branch(branch)) => branch,
            other => panic!("cannot commit with HEAD at {other:?}"),
        };
        self.commit_on(&branch, file, content, message)
    }

    /// Commit a file change directly on a branch
    pub fn commit_on(&self, branch: &str, file: &str, content: &str, message: &str) -> String {
        let mut state = self.state.borrow_mut();
        let parent = state.tip(branch).unwrap();
        let mut files = state.commits[&parent].files.clone();
        files.insert(file.to_string(), content.to_string());
        let id = state.new_commit(Some(parent), files, message);
        state.branches.insert(branch.to_string(), id.clone());
        id
    }

    /// Create a branch at another branch's tip without recording a call
    pub fn add_branch(&self, name: &str, from: &str) {
        let mut state = self.state.borrow_mut();
        let tip = state.tip(from).unwrap();
        state.branches.insert(name.to_string(), tip);
    }

    /// Switch branches without recording a call, like a user running git
    pub fn switch_to(&self, name: &str) {
        let mut state = self.state.borrow_mut();
        assert!(state.branches.contains_key(name), "no branch {name}");
        state.head = Some(Head::Branch(name.to_string()));
    }

    /// Point a branch at an existing commit, like `git reset --hard`
    pub fn reset_branch(&self, name: &str, commit: &str) {
        let mut state = self.state.borrow_mut();
        assert!(state.commits.contains_key(commit), "no commit {commit}");
        state.branches.insert(name.to_string(), commit.to_string());
    }

    pub fn detach_at(&self, commit: &str) {
        self.state.borrow_mut().head = Some(Head::Detached(commit.to_string()));
    }

    /// Remove a branch without recording a call
    pub fn remove_branch(&self, name: &str) {
        self.state.borrow_mut().branches.remove(name);
    }

    pub fn head(&self) -> Option<Head> {
        self.state.borrow().head.clone()
    }

    pub fn branch_tip(&self, name: &str) -> String {
        self.state.borrow().tip(name).unwrap()
    }

    pub fn is_rebasing(&self) -> bool {
        self.state.borrow().rebase.is_some()
    }

    pub fn file_at(&self, commit: &str, file: &str) -> Option<String> {
        self.state.borrow().commits[commit].files.get(file).cloned()
    }

    pub fn message_of(&self, commit: &str) -> String {
        self.state.borrow().commits[commit].message.clone()
    }

    /// Operations issued through the trait, e.g. `"checkout beta"`
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Make the next call of `operation` fail with a collaborator error
    pub fn fail_next(&self, operation: &str) {
        self.state.borrow_mut().failures.insert(operation.to_string());
    }

    fn record(&self, operation: &str, detail: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("{operation} {detail}").trim_end().to_string());
        if state.failures.remove(operation) {
            return Err(PatchStackError::collaborator(format!(
                "injected {operation} failure"
            )));
        }
        Ok(())
    }

    fn ensure_not_rebasing(&self, operation: &str) -> Result<()> {
        if self.is_rebasing() {
            return Err(PatchStackError::collaborator(format!(
                "cannot {operation} while a rebase is in progress"
            )));
        }
        Ok(())
    }
}

/// Three-way merge of two snapshots over a common base
fn merge_files(base: &Files, ours: &Files, theirs: &Files) -> std::result::Result<Files, Vec<String>> {
    let paths: BTreeSet<&String> = base.keys().chain(ours.keys()).chain(theirs.keys()).collect();

    let mut merged = Files::new();
    let mut conflicts = Vec::new();
    for path in paths {
        let (b, o, t) = (base.get(path), ours.get(path), theirs.get(path));
        let result = if t == b {
            o
        } else if o == b || o == t {
            t
        } else {
            conflicts.push(path.clone());
            continue;
        };
        if let Some(content) = result {
            merged.insert(path.clone(), content.clone());
        }
    }

    if conflicts.is_empty() {
        Ok(merged)
    } else {
        Err(conflicts)
    }
}

impl VersionControl for FakeVcs {
    fn current_branch(&self) -> Result<Option<String>> {
        match self.head() {
            Some(Head::Branch(name)) => Ok(Some(name)),
            _ => Ok(None),
        }
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state.borrow().branches.contains_key(name))
    }

    fn create_branch(&self, name: &str, from_tip: &str) -> Result<()> {
        self.record("create_branch", name)?;
        let mut state = self.state.borrow_mut();
        if state.branches.contains_key(name) {
            return Err(PatchStackError::collaborator(format!("branch {name} exists")));
        }
        state.commit(from_tip)?;
        state.branches.insert(name.to_string(), from_tip.to_string());
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.record("checkout", name)?;
        self.ensure_not_rebasing("checkout")?;
        let mut state = self.state.borrow_mut();
        if !state.branches.contains_key(name) {
            return Err(PatchStackError::BranchNotFound(name.to_string()));
        }
        state.head = Some(Head::Branch(name.to_string()));
        Ok(())
    }

    fn tip(&self, name: &str) -> Result<String> {
        self.state.borrow().tip(name)
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>> {
        let state = self.state.borrow();
        state.commit(a)?;
        state.commit(b)?;
        let ancestors: HashSet<String> = state.history(a).into_iter().collect();
        Ok(state.history(b).into_iter().find(|id| ancestors.contains(id)))
    }

    fn is_descendant(&self, commit: &str, ancestor: &str) -> Result<bool> {
        let state = self.state.borrow();
        state.commit(commit)?;
        Ok(state.history(commit).iter().any(|id| id == ancestor))
    }

    fn rebase(&self, branch: &str, upstream: &str, onto: &str) -> Result<RebaseOutcome> {
        self.record("rebase", &format!("{branch} onto {onto}"))?;
        self.ensure_not_rebasing("rebase")?;

        let mut state = self.state.borrow_mut();
        let tip = state.tip(branch)?;
        state.commit(upstream)?;
        state.commit(onto)?;

        let excluded: HashSet<String> = state.history(upstream).into_iter().collect();
        let mut to_replay: VecDeque<String> = VecDeque::new();
        for id in state.history(&tip) {
            if excluded.contains(&id) {
                break;
            }
            to_replay.push_front(id);
        }

        let mut current = onto.to_string();
        for id in to_replay {
            let commit = state.commits[&id].clone();
            let base = commit
                .parent
                .as_ref()
                .map(|p| state.commits[p].files.clone())
                .unwrap_or_default();
            let ours = state.commits[&current].files.clone();

            match merge_files(&base, &ours, &commit.files) {
                Ok(files) if files == ours => {}
                Ok(files) => {
                    current = state.new_commit(Some(current), files, &commit.message);
                }
                Err(paths) => {
                    state.rebase = Some(InProgressRebase {
                        branch: branch.to_string(),
                    });
                    state.head = Some(Head::Detached(current));
                    return Ok(RebaseOutcome::Conflict { paths });
                }
            }
        }

        state.branches.insert(branch.to_string(), current.clone());
        state.head = Some(Head::Branch(branch.to_string()));
        Ok(RebaseOutcome::Completed { new_tip: current })
    }

    fn abort_rebase(&self) -> Result<()> {
        self.record("abort_rebase", "")?;
        let mut state = self.state.borrow_mut();
        let in_progress = state
            .rebase
            .take()
            .ok_or_else(|| PatchStackError::collaborator("No rebase in progress to abort"))?;
        state.head = Some(Head::Branch(in_progress.branch));
        Ok(())
    }

    fn diff(&self, base: &str, end: &str) -> Result<String> {
        let state = self.state.borrow();
        let before = &state.commit(base)?.files;
        let after = &state.commit(end)?.files;

        let paths: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
        let mut text = String::new();
        for path in paths {
            match (before.get(path), after.get(path)) {
                (old, new) if old == new => {}
                (old, new) => {
                    text.push_str(&format!("--- {path}\n"));
                    if let Some(old) = old {
                        text.push_str(&format!("-{old}"));
                    }
                    if let Some(new) = new {
                        text.push_str(&format!("+{new}"));
                    }
                }
            }
        }
        Ok(text)
    }

    fn log(&self, base: &str, end: &str) -> Result<Vec<CommitSummary>> {
        let state = self.state.borrow();
        state.commit(base)?;
        let hidden: HashSet<String> = state.history(base).into_iter().collect();

        Ok(state
            .history(end)
            .into_iter()
            .take_while(|id| !hidden.contains(id))
            .map(|id| CommitSummary {
                summary: state.commits[&id].message.clone(),
                author: "Test".to_string(),
                time: None,
                id,
            })
            .collect())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        self.record("delete_branch", name)?;
        let mut state = self.state.borrow_mut();
        if state.head == Some(Head::Branch(name.to_string())) {
            return Err(PatchStackError::collaborator("cannot delete the current branch"));
        }
        state
            .branches
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PatchStackError::BranchNotFound(name.to_string()))
    }
}

/// One call made to the review tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCall {
    UploadDiff {
        base: String,
        head: String,
        update: Option<String>,
    },
    Land {
        base: String,
        head: String,
    },
}

#[derive(Default)]
pub struct RecordingReview {
    calls: RefCell<Vec<ReviewCall>>,
    fail: RefCell<bool>,
}

impl RecordingReview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let review = Self::default();
        *review.fail.borrow_mut() = true;
        review
    }

    pub fn calls(&self) -> Vec<ReviewCall> {
        self.calls.borrow().clone()
    }

    fn respond(&self) -> Result<()> {
        if *self.fail.borrow() {
            Err(PatchStackError::collaborator("review tool exited with 1"))
        } else {
            Ok(())
        }
    }
}

impl ReviewService for RecordingReview {
    fn upload_diff(&self, base: &str, head: &str, update: Option<&str>) -> Result<()> {
        self.calls.borrow_mut().push(ReviewCall::UploadDiff {
            base: base.to_string(),
            head: head.to_string(),
            update: update.map(str::to_string),
        });
        self.respond()
    }

    fn land(&self, base: &str, head: &str) -> Result<()> {
        self.calls.borrow_mut().push(ReviewCall::Land {
            base: base.to_string(),
            head: head.to_string(),
        });
        self.respond()
    }
}

/// Fake repository on `master` plus a store in a temp dir
pub struct Fixture {
    pub vcs: FakeVcs,
    pub store: StackStore,
    _temp_dir: TempDir,
}

impl Fixture {
    /// Repository and store, not yet initialized
    pub fn bare() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let store = StackStore::new(&temp_dir.path().join("patchstack"));
        Self {
            vcs: FakeVcs::new("master"),
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Initialized on `master`
    pub fn new() -> Self {
        let fixture = Self::bare();
        fixture.store.init("master").unwrap();
        fixture
    }

    pub fn context(&self) -> patchstack::stack::StackContext<'_> {
        patchstack::stack::StackContext::new(&self.vcs, &self.store)
    }

    pub fn navigator(&self) -> patchstack::stack::Navigator<'_> {
        patchstack::stack::Navigator::new(self.context())
    }

    pub fn reporter(&self) -> patchstack::stack::Reporter<'_> {
        patchstack::stack::Reporter::new(self.context())
    }

    pub fn stack(&self) -> patchstack::stack::Stack {
        self.store.load_unchecked().unwrap()
    }

    pub fn names(&self) -> Vec<String> {
        self.stack()
            .entry_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn position(&self) -> Option<String> {
        self.vcs.current_branch().unwrap()
    }
}
