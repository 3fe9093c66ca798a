use super::Workspace;
use crate::cli::output::Output;
use crate::errors::Result;
use crate::review::{CommandReview, ReviewBridge};

pub async fn arcdiff(update: Option<String>) -> Result<()> {
    let workspace = Workspace::open()?;
    let review = CommandReview::new(&workspace.settings.review, workspace.repo.path());

    let target = ReviewBridge::new(workspace.context(), &review).arcdiff(update.as_deref())?;
    Output::success(format!(
        "Uploaded '{}' (against '{}')",
        target.patch, target.parent
    ));
    Ok(())
}

pub async fn arcland() -> Result<()> {
    let workspace = Workspace::open()?;
    let review = CommandReview::new(&workspace.settings.review, workspace.repo.path());

    let target = ReviewBridge::new(workspace.context(), &review).arcland()?;
    Output::success(format!("Landed '{}'", target.patch));
    Output::sub_item("The stack was not changed; untrack the patch once it is merged");
    Ok(())
}
