use super::Stack;
use crate::config::get_state_dir;
use crate::errors::{PatchStackError, Result};
use crate::git::VersionControl;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File holding the persisted stack inside the state directory
pub const STACK_FILE: &str = "stack.json";

/// Persists the stack for one repository
#[derive(Debug, Clone)]
pub struct StackStore {
    /// Directory holding the stack file (and repository settings)
    state_dir: PathBuf,
    /// Path to the stack file
    stack_file: PathBuf,
}

impl StackStore {
    /// Store rooted at an explicit state directory
    pub fn new(state_dir: &Path) -> Self {
        Self {
            state_dir: state_dir.to_path_buf(),
            stack_file: state_dir.join(STACK_FILE),
        }
    }

    /// Store for the repository whose working tree is at `workdir`
    pub fn for_repository(workdir: &Path) -> Result<Self> {
        Ok(Self::new(&get_state_dir(workdir)?))
    }

    pub fn stack_file(&self) -> &Path {
        &self.stack_file
    }

    pub fn is_initialized(&self) -> bool {
        self.stack_file.exists()
    }

    /// Create the store holding only the root
    pub fn init(&self, root: &str) -> Result<Stack> {
        if self.is_initialized() {
            let existing = self.load_unchecked()?;
            return Err(PatchStackError::AlreadyInitialized {
                root: existing.root,
            });
        }

        let stack = Stack::new(root);
        stack.validate().map_err(PatchStackError::CorruptStack)?;
        self.save(&stack)?;

        info!("Initialized stack rooted at '{}'", root);
        Ok(stack)
    }

    /// Delete the store. Branches are not touched.
    pub fn destroy(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(PatchStackError::NotInitialized);
        }

        fs::remove_file(&self.stack_file)?;
        info!("Removed stack file {}", self.stack_file.display());
        Ok(())
    }

    /// Load the stack and check every entry against the repository.
    ///
    /// Entries whose branch is gone are reported together as
    /// [`PatchStackError::DanglingPatch`]; nothing is removed.
    pub fn load(&self, vcs: &dyn VersionControl) -> Result<Stack> {
        let (stack, dangling) = self.load_lenient(vcs)?;
        if !dangling.is_empty() {
            return Err(PatchStackError::DanglingPatch { names: dangling });
        }
        Ok(stack)
    }

    /// Load the stack along with the names of entries whose branch is gone
    pub fn load_lenient(&self, vcs: &dyn VersionControl) -> Result<(Stack, Vec<String>)> {
        let stack = self.load_unchecked()?;

        let mut dangling = Vec::new();
        for name in stack.entry_names() {
            if !vcs.branch_exists(name)? {
                dangling.push(name.to_string());
            }
        }

        if !dangling.is_empty() {
            debug!("Stack entries without a branch: {:?}", dangling);
        }
        Ok((stack, dangling))
    }

    /// Load and structurally validate the stack without asking the repository
    pub fn load_unchecked(&self) -> Result<Stack> {
        if !self.is_initialized() {
            return Err(PatchStackError::NotInitialized);
        }

        let content = fs::read_to_string(&self.stack_file)?;
        let stack: Stack = serde_json::from_str(&content).map_err(|e| {
            PatchStackError::corrupt(format!(
                "Failed to parse {}: {e}",
                self.stack_file.display()
            ))
        })?;

        stack.validate().map_err(PatchStackError::CorruptStack)?;
        Ok(stack)
    }

    /// Persist the stack atomically
    pub fn save(&self, stack: &Stack) -> Result<()> {
        stack.validate().map_err(PatchStackError::CorruptStack)?;

        if !self.state_dir.exists() {
            fs::create_dir_all(&self.state_dir).map_err(|e| {
                PatchStackError::config(format!("Failed to create state directory: {e}"))
            })?;
        }

        crate::utils::atomic_file::write_json(&self.stack_file, stack)?;
        debug!(
            "Saved stack ({} patch(es)) to {}",
            stack.len(),
            self.stack_file.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::Patch;
    use tempfile::TempDir;

    fn create_store() -> (TempDir, StackStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = StackStore::new(&temp_dir.path().join("patchstack"));
        (temp_dir, store)
    }

    #[test]
    fn test_init_and_reload() {
        let (_temp_dir, store) = create_store();
        assert!(!store.is_initialized());

        let stack = store.init("master").unwrap();
        assert!(store.is_initialized());
        assert_eq!(store.load_unchecked().unwrap(), stack);
    }

    #[test]
    fn test_init_twice_fails() {
        let (_temp_dir, store) = create_store();
        store.init("master").unwrap();

        match store.init("main") {
            Err(PatchStackError::AlreadyInitialized { root }) => assert_eq!(root, "master"),
            other => panic!("expected AlreadyInitialized, got {other:?}"),
        }
    }

    #[test]
    fn test_load_before_init() {
        let (_temp_dir, store) = create_store();
        assert!(matches!(
            store.load_unchecked(),
            Err(PatchStackError::NotInitialized)
        ));
        assert!(matches!(store.destroy(), Err(PatchStackError::NotInitialized)));
    }

    #[test]
    fn test_save_round_trip_keeps_order_and_sync() {
        let (_temp_dir, store) = create_store();
        let mut stack = store.init("master").unwrap();
        stack.insert_after("master", Patch::new("alpha", "").with_sync("b1", "t1"));
        stack.insert_after("alpha", Patch::new("beta", ""));
        store.save(&stack).unwrap();

        let loaded = store.load_unchecked().unwrap();
        assert_eq!(loaded.entry_names(), vec!["master", "alpha", "beta"]);
        assert_eq!(loaded.patch("alpha").unwrap().synced, stack.patch("alpha").unwrap().synced);
        assert!(loaded.patch("beta").unwrap().synced.is_none());
    }

    #[test]
    fn test_invalid_stack_is_not_saved() {
        let (_temp_dir, store) = create_store();
        let mut stack = store.init("master").unwrap();
        stack.patches.push(Patch::new("orphan", "somewhere"));

        assert!(matches!(
            store.save(&stack),
            Err(PatchStackError::CorruptStack(_))
        ));
        // Previous state survives
        assert!(store.load_unchecked().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let (_temp_dir, store) = create_store();
        store.init("master").unwrap();
        fs::write(store.stack_file(), "{ not json").unwrap();

        assert!(matches!(
            store.load_unchecked(),
            Err(PatchStackError::CorruptStack(_))
        ));
    }

    #[test]
    fn test_destroy_removes_file() {
        let (_temp_dir, store) = create_store();
        store.init("master").unwrap();

        store.destroy().unwrap();
        assert!(!store.is_initialized());
        store.init("main").unwrap();
    }
}
