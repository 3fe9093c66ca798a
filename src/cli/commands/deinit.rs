use super::Workspace;
use crate::cli::output::Output;
use crate::errors::{PatchStackError, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};

/// Delete the stack file, leaving every branch in place
pub async fn run(yes: bool) -> Result<()> {
    let workspace = Workspace::open()?;
    let prompt = match workspace.store.load_unchecked() {
        Ok(stack) => format!(
            "Stop tracking {} patch(es) on '{}'?",
            stack.len(),
            stack.root
        ),
        Err(PatchStackError::NotInitialized) => return Err(PatchStackError::NotInitialized),
        Err(e) => format!("Remove the unreadable stack file ({e})?"),
    };

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| PatchStackError::config(format!("Input error: {e}")))?;

        if !confirmed {
            Output::info("Deinit cancelled");
            return Ok(());
        }
    }

    workspace.store.destroy()?;
    Output::success("Stack removed, branches were left untouched");
    Ok(())
}
