use super::Workspace;
use crate::cli::output::Output;
use crate::errors::{PatchStackError, Result};
use crate::git::VersionControl;

/// Initialize a stack rooted at `root`
pub async fn run(root: &str) -> Result<()> {
    let workspace = Workspace::open()?;

    if !workspace.repo.branch_exists(root)? {
        return Err(PatchStackError::BranchNotFound(root.to_string()));
    }

    workspace.store.init(root)?;
    let info = workspace.repo.get_info()?;

    Output::success(format!("Initialized stack on '{root}'"));
    Output::sub_item(format!("Repository: {}", info.path.display()));
    Output::sub_item(format!(
        "Stack file: {}",
        workspace.store.stack_file().display()
    ));
    if info.head_branch.as_deref() != Some(root) {
        Output::tip(format!("Run 'git checkout {root}' before 'pstack push --new <name>'"));
    }

    Ok(())
}
