use super::{Stack, StackStore};
use crate::errors::{PatchStackError, Result};
use crate::git::VersionControl;

/// Repository and store handed to every stack operation
#[derive(Clone, Copy)]
pub struct StackContext<'a> {
    pub vcs: &'a dyn VersionControl,
    pub store: &'a StackStore,
}

impl<'a> StackContext<'a> {
    pub fn new(vcs: &'a dyn VersionControl, store: &'a StackStore) -> Self {
        Self { vcs, store }
    }

    /// Load the stack, failing on missing branches
    pub fn load(&self) -> Result<Stack> {
        self.store.load(self.vcs)
    }

    /// Load the stack along with entries whose branch is missing
    pub fn load_lenient(&self) -> Result<(Stack, Vec<String>)> {
        self.store.load_lenient(self.vcs)
    }

    /// The checked-out branch, which must be a stack entry
    pub fn position(&self, stack: &Stack) -> Result<String> {
        match self.vcs.current_branch()? {
            Some(branch) if stack.contains(&branch) => Ok(branch),
            Some(branch) => Err(PatchStackError::not_in_stack(branch)),
            None => Err(PatchStackError::not_in_stack("(detached HEAD)")),
        }
    }

    /// An explicitly named entry, or the position when none is given
    pub fn target(&self, stack: &Stack, name: Option<&str>) -> Result<String> {
        match name {
            Some(name) if stack.contains(name) => Ok(name.to_string()),
            Some(name) => Err(PatchStackError::NotTracked(name.to_string())),
            None => self.position(stack),
        }
    }
}
