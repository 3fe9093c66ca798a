use super::Workspace;
use crate::cli::output::Output;
use crate::errors::Result;
use crate::stack::{Movement, Navigator};
use crate::utils::spinner::Spinner;

/// `push`, `push --new NAME` or `push --branch NAME`
pub async fn push(new: Option<String>, branch: Option<String>) -> Result<()> {
    let workspace = Workspace::open()?;
    let navigator = Navigator::new(workspace.context());

    let spinner = Spinner::new("Pushing...");
    let result = match (new.as_deref(), branch.as_deref()) {
        (Some(name), _) => navigator.push_new(name),
        (None, Some(name)) => navigator.push_branch(name),
        (None, None) => navigator.push(),
    };
    spinner.stop();

    let movement = result?;
    if let Some(summary) = &movement.rebased {
        Output::info(format!(
            "Rebased '{}' onto its parent ({} -> {})",
            summary.patch,
            short(&summary.old_tip),
            short(&summary.new_tip)
        ));
    }
    if new.is_some() {
        Output::success(format!("Created '{}' on top of '{}'", movement.to, movement.from));
    } else if branch.is_some() {
        Output::success(format!("Now tracking '{}' on top of '{}'", movement.to, movement.from));
    } else {
        report(&movement);
    }
    Ok(())
}

/// `pop` or `pop --all`
pub async fn pop(all: bool) -> Result<()> {
    let workspace = Workspace::open()?;
    let navigator = Navigator::new(workspace.context());

    let movement = if all {
        navigator.pop_all()?
    } else {
        navigator.pop()?
    };
    report(&movement);
    Ok(())
}

pub async fn untrack(name: &str) -> Result<()> {
    let workspace = Workspace::open()?;
    let removed = Navigator::new(workspace.context()).untrack(name)?;

    Output::success(format!("Stopped tracking '{}'", removed.name));
    Output::sub_item(format!(
        "Branch '{}' was kept; delete it with 'git branch -D {}' if unwanted",
        removed.name, removed.name
    ));
    Ok(())
}

fn report(movement: &Movement) {
    Output::success(format!("{} -> {}", movement.from, movement.to));
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
