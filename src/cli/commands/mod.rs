pub mod completions;
pub mod config;
pub mod deinit;
pub mod init;
pub mod navigate;
pub mod review;
pub mod show;

use crate::config::load_settings;
use crate::config::Settings;
use crate::errors::Result;
use crate::git::{get_current_repository, GitRepository};
use crate::stack::{StackContext, StackStore};

/// The repository the command runs in, with its store and settings
pub struct Workspace {
    pub repo: GitRepository,
    pub store: StackStore,
    pub settings: Settings,
}

impl Workspace {
    pub fn open() -> Result<Self> {
        let repo = get_current_repository()?;
        let store = StackStore::for_repository(repo.path())?;
        let settings = load_settings(repo.path())?;
        Ok(Self {
            repo,
            store,
            settings,
        })
    }

    pub fn context(&self) -> StackContext<'_> {
        StackContext::new(&self.repo, &self.store)
    }
}
