/// Patchstack Error Types
#[derive(Debug, thiserror::Error)]
pub enum PatchStackError {
    /// The repository has no stack yet
    #[error("This repository is not initialized, run 'pstack init <root>' first")]
    NotInitialized,

    /// A stack already exists for this repository
    #[error("This repository is already initialized (root: {root})")]
    AlreadyInitialized { root: String },

    /// Tracked entries whose branch no longer exists
    #[error("Tracked branches are missing from the repository: {}", names.join(", "))]
    DanglingPatch { names: Vec<String> },

    /// The persisted stack breaks a structural invariant
    #[error("Stack file is corrupt: {0}")]
    CorruptStack(String),

    /// The checked-out branch is not part of the stack
    #[error("Current branch '{branch}' is not tracked in the stack")]
    NotInStack { branch: String },

    /// A branch that was expected to exist does not
    #[error("Branch '{0}' does not exist")]
    BranchNotFound(String),

    /// `push` with nothing above the current position
    #[error("Cannot push: '{position}' is the top of the stack")]
    TopOfStack { position: String },

    /// `pop` (or a parent lookup) on the root
    #[error("Already at the root of the stack ('{root}')")]
    AtRoot { root: String },

    /// `push --new` with a name that is tracked or already a branch
    #[error("Name '{0}' is already in use")]
    NameInUse(String),

    /// `push --branch` with a name that is already tracked
    #[error("Branch '{0}' is already tracked in the stack")]
    AlreadyTracked(String),

    /// `untrack` on a name that is not a patch
    #[error("Branch '{0}' is not tracked in the stack")]
    NotTracked(String),

    /// `untrack` on an interior patch
    #[error("Cannot untrack '{name}': {} depends on it", dependents.join(", "))]
    HasDependents {
        name: String,
        dependents: Vec<String>,
    },

    /// A rebase stopped on conflicts and was rolled back
    #[error("Rebasing '{patch}' conflicts in: {}", paths.join(", "))]
    RebaseConflict { patch: String, paths: Vec<String> },

    /// An external version-control or review call failed
    #[error("External command failed: {0}")]
    Collaborator(String),

    /// Git-related errors
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PatchStackError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PatchStackError::Config(msg.into())
    }

    pub fn collaborator<S: Into<String>>(msg: S) -> Self {
        PatchStackError::Collaborator(msg.into())
    }

    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        PatchStackError::CorruptStack(msg.into())
    }

    pub fn not_in_stack<S: Into<String>>(branch: S) -> Self {
        PatchStackError::NotInStack {
            branch: branch.into(),
        }
    }

    /// True when the failure came from the repository or review tooling
    /// rather than from the stack rules.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            PatchStackError::Collaborator(_) | PatchStackError::Git(_)
        )
    }

    /// Follow-up suggestion shown by the CLI under the error
    pub fn hint(&self) -> Option<String> {
        match self {
            PatchStackError::NotInitialized => {
                Some("Run 'pstack init master' (or your base branch)".to_string())
            }
            PatchStackError::DanglingPatch { names } => Some(format!(
                "Recreate the branches or drop them with 'pstack untrack {}'",
                names.first().map(String::as_str).unwrap_or("<name>")
            )),
            PatchStackError::NotInStack { .. } => {
                Some("Check out a tracked branch, see 'pstack show'".to_string())
            }
            PatchStackError::TopOfStack { .. } => {
                Some("Start a new patch with 'pstack push --new <name>'".to_string())
            }
            PatchStackError::RebaseConflict { patch, .. } => Some(format!(
                "The rebase was rolled back. Rebase '{patch}' manually, then push again"
            )),
            PatchStackError::HasDependents { dependents, .. } => dependents
                .first()
                .map(|child| format!("Untrack '{child}' first, working down from the top")),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PatchStackError>;
